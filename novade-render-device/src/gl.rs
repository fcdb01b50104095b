//! GL entry points consulted by the render device.

use glow::HasContext;

/// `GL_RGBA8`, the sized internal format reported for the window framebuffer.
pub const GL_RGBA8: u32 = 0x8058;

/// The slice of the GL function table the render device calls itself.
///
/// The full table is handed to the 2D rendering library through
/// [`GpuContext`](crate::target::GpuContext); only these two calls are made
/// from here, always with the device context current.
pub trait GlFunctions {
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);

    /// Name of the framebuffer object bound to `GL_FRAMEBUFFER`.
    fn framebuffer_binding(&self) -> u32;
}

impl GlFunctions for glow::Context {
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        // SAFETY: the render device only calls this with its context current.
        unsafe { HasContext::viewport(self, x, y, width, height) }
    }

    fn framebuffer_binding(&self) -> u32 {
        // SAFETY: as above; FRAMEBUFFER_BINDING is a single integer query.
        let name = unsafe { self.get_parameter_i32(glow::FRAMEBUFFER_BINDING) };
        u32::try_from(name).unwrap_or(0)
    }
}
