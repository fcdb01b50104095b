//! Objects handed to the 2D rendering library.

use std::fmt;
use std::sync::Arc;

use crate::gl::GL_RGBA8;

/// Stencil depth reported for the window framebuffer.
pub const STENCIL_BITS: u32 = 8;

/// Snapshot of the framebuffer bound after a resize.
///
/// Valid until the next resize of the device that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTargetDescriptor {
    pub width: u32,
    pub height: u32,
    /// Always 0: the window framebuffer is not multisampled.
    pub sample_count: u32,
    pub stencil_bits: u32,
    /// GL name of the bound framebuffer object (0 for the default framebuffer).
    pub framebuffer_id: u32,
    /// Sized internal format, always `GL_RGBA8`.
    pub format: u32,
}

impl RenderTargetDescriptor {
    pub fn new(width: u32, height: u32, framebuffer_id: u32) -> Self {
        Self {
            width,
            height,
            sample_count: 0,
            stencil_bits: STENCIL_BITS,
            framebuffer_id,
            format: GL_RGBA8,
        }
    }
}

/// A device's GL function table, wrapped for the 2D rendering library.
///
/// Shares the table with the device; it stays usable only while the device
/// context is current on the calling thread.
pub struct GpuContext<F> {
    functions: Arc<F>,
}

impl<F> GpuContext<F> {
    pub(crate) fn new(functions: Arc<F>) -> Self {
        Self { functions }
    }

    pub fn functions(&self) -> &F {
        &self.functions
    }

    pub fn shared_functions(&self) -> Arc<F> {
        Arc::clone(&self.functions)
    }
}

impl<F> Clone for GpuContext<F> {
    fn clone(&self) -> Self {
        Self {
            functions: Arc::clone(&self.functions),
        }
    }
}

impl<F> fmt::Debug for GpuContext<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuContext")
            .field("functions", &Arc::as_ptr(&self.functions))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_reports_fixed_format() {
        let desc = RenderTargetDescriptor::new(800, 600, 0);
        assert_eq!(desc.format, 0x8058);
        assert_eq!(desc.stencil_bits, 8);
        assert_eq!(desc.sample_count, 0);
    }

    #[test]
    fn gpu_context_shares_the_table() {
        let table = Arc::new(42u8);
        let ctx = GpuContext::new(Arc::clone(&table));
        let copy = ctx.clone();
        assert_eq!(*copy.functions(), 42);
        assert_eq!(Arc::strong_count(&table), 3);
    }
}
