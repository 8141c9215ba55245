use std::{
    ffi::{c_void, CStr},
    ptr,
};

use log::{debug, error, info, warn};

/// Abstraction for building and using OpenGL shader programs.
pub mod shader;

/// Routes driver debug output through the logger. Only available on contexts
/// whose driver exposes KHR_debug; otherwise this is a no-op.
pub fn init_debug() {
    unsafe {
        if !gl::DebugMessageCallback::is_loaded() {
            return;
        }

        gl::Enable(gl::DEBUG_OUTPUT);
        gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
        gl::DebugMessageCallback(Some(gl_debug_callback), ptr::null());
        gl::DebugMessageControl(
            gl::DONT_CARE,
            gl::DONT_CARE,
            gl::DONT_CARE,
            0,
            ptr::null(),
            gl::TRUE,
        );
    };
}

extern "system" fn gl_debug_callback(
    _src: u32,
    _typ: u32,
    id: u32,
    severity: u32,
    _len: i32,
    msg: *const i8,
    _user_param: *mut c_void,
) {
    // Buffer creation on NVidia cards
    if id == 131185 {
        return;
    }

    let msg = unsafe { CStr::from_ptr(msg) };
    let msg = msg.to_string_lossy();

    match severity {
        gl::DEBUG_SEVERITY_NOTIFICATION => debug!("OpenGL: {msg}"),
        gl::DEBUG_SEVERITY_LOW => info!("OpenGL: {msg}"),
        gl::DEBUG_SEVERITY_MEDIUM => warn!("OpenGL: {msg}"),
        gl::DEBUG_SEVERITY_HIGH => error!("OpenGL: {msg}"),
        _ => error!("OpenGL (unknown severity {severity}): {msg}"),
    }
}
