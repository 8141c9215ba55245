use eyre::Result;
use log::warn;

use ogl::shader::ShaderProgram;
use quad::Quad;
use window::{GlWindow, WindowConfig};

mod ogl;
mod quad;
mod window;

fn main() -> Result<()> {
    env_logger::init();

    let config = WindowConfig {
        title: "learngl",
        width: 800,
        height: 600,
    };
    let mut window = GlWindow::new(&config)?;
    ogl::init_debug();

    // A broken shader draws garbage instead of taking the whole loop down,
    // so the build never fails here; the status is only worth a warning.
    let shader = ShaderProgram::from_file("shaders/quad.vert", "shaders/quad.frag");
    if !shader.status().is_ready() {
        warn!("shader program is not usable, expect a blank draw");
    }

    //  d - a
    //  |   |
    //  c - b
    let vertices = [
        // pos           // color       // texture
        0.5, 0.5, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, // a
        0.5, -0.5, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, // b
        -0.5, -0.5, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, // c
        -0.5, 0.5, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, // d
    ];
    let indices = [0, 1, 3, 1, 2, 3];

    let quad = Quad::new(&vertices, &indices);

    shader.use_program();
    shader.set_f32(1.0, "brightness");

    let ctx = RenderContext {
        shader: &shader,
        quad: &quad,
        clear_color: [0.2, 0.3, 0.3, 1.0],
    };

    while window.poll_events() {
        render(&ctx);
        window.swap();
    }

    quad.delete();
    shader.delete();

    Ok(())
}

/// Everything one frame needs, passed by reference instead of being captured
/// by a closure.
struct RenderContext<'a> {
    shader: &'a ShaderProgram,
    quad: &'a Quad,
    clear_color: [f32; 4],
}

fn render(ctx: &RenderContext) {
    let [r, g, b, a] = ctx.clear_color;

    unsafe {
        gl::ClearColor(r, g, b, a);
        gl::Clear(gl::COLOR_BUFFER_BIT);
    }

    ctx.shader.use_program();
    ctx.quad.draw();
}
