use eyre::{eyre, Result};
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
    video::Window,
    video::{GLContext, GLProfile, SwapInterval},
    EventPump, Sdl, VideoSubsystem,
};

/// Window parameters, passed in explicitly instead of living in globals.
pub struct WindowConfig<'a> {
    pub title: &'a str,
    pub width: u32,
    pub height: u32,
}

pub struct GlWindow {
    _sdl_context: Sdl,
    _video_subsystem: VideoSubsystem,
    window: Window,
    _gl_ctx: GLContext,
    event_pump: EventPump,
}

impl GlWindow {
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl_context = sdl2::init().map_err(|e| eyre!("{e}"))?;
        let video_subsystem = sdl_context.video().map_err(|e| eyre!("{e}"))?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_major_version(3);
        gl_attr.set_context_minor_version(3);
        gl_attr.set_context_profile(GLProfile::Core);
        gl_attr.set_double_buffer(true);

        let window = video_subsystem
            .window(config.title, config.width, config.height)
            .opengl()
            .resizable()
            .position_centered()
            .build()?;

        let gl_ctx = window.gl_create_context().map_err(|e| eyre!("{e}"))?;
        gl::load_with(|name| video_subsystem.gl_get_proc_address(name) as *const _);

        window
            .subsystem()
            .gl_set_swap_interval(SwapInterval::VSync)
            .map_err(|e| eyre!("{e}"))?;

        unsafe {
            gl::Viewport(0, 0, config.width as i32, config.height as i32);
        }

        let event_pump = sdl_context.event_pump().map_err(|e| eyre!("{e}"))?;

        Ok(Self {
            _sdl_context: sdl_context,
            _video_subsystem: video_subsystem,
            window,
            _gl_ctx: gl_ctx,
            event_pump,
        })
    }

    /// Drains pending events and returns whether the window should stay open.
    /// Escape and the close button terminate; resizes update the viewport.
    pub fn poll_events(&mut self) -> bool {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => return false,
                Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return false,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(w, h),
                    ..
                } => unsafe {
                    gl::Viewport(0, 0, w, h);
                },
                _ => (),
            }
        }

        true
    }

    pub fn swap(&self) {
        self.window.gl_swap_window();
    }
}
