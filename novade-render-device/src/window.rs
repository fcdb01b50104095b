//! Native window handles and the window-styling collaborator.

use tracing::debug;

/// Opaque native window identity handed over by the windowing toolkit.
///
/// `window` is the native window (an `HWND` on Windows) and `device_context`
/// the native display/device context used to open the EGL display (the `HDC`
/// obtained from the window). Both are stored as integers and never
/// dereferenced by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindow {
    pub window: usize,
    pub device_context: usize,
}

impl NativeWindow {
    pub fn new(window: usize, device_context: usize) -> Self {
        Self {
            window,
            device_context,
        }
    }

    pub fn window_ptr(&self) -> *mut std::ffi::c_void {
        self.window as *mut std::ffi::c_void
    }

    pub fn device_context_ptr(&self) -> *mut std::ffi::c_void {
        self.device_context as *mut std::ffi::c_void
    }
}

/// Window styling hook invoked before the display is acquired.
///
/// The toolkit owns window styles; the render device only asks for
/// transparency once, when the caller requested it.
pub trait WindowStyler {
    fn enable_transparency(&self, window: NativeWindow);
}

/// Styler for toolkits that configure transparency themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStyler;

impl WindowStyler for NoopStyler {
    fn enable_transparency(&self, window: NativeWindow) {
        debug!(window = window.window, "transparency requested; left to the toolkit");
    }
}

impl<F> WindowStyler for F
where
    F: Fn(NativeWindow),
{
    fn enable_transparency(&self, window: NativeWindow) {
        self(window)
    }
}
