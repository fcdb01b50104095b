//! Display acquisition on ANGLE's D3D11 platform.

use khronos_egl as egl;
use tracing::{debug, info};

use crate::backend::EglBackend;
use crate::error::{EglError, ErrorKind, RenderError};
use crate::window::NativeWindow;

/// `EGL_PLATFORM_ANGLE_ANGLE`
pub const PLATFORM_ANGLE_ANGLE: egl::Enum = 0x3202;
/// `EGL_PLATFORM_ANGLE_TYPE_ANGLE`
pub const PLATFORM_ANGLE_TYPE_ANGLE: egl::Int = 0x3203;
/// `EGL_PLATFORM_ANGLE_TYPE_D3D11_ANGLE`
pub const PLATFORM_ANGLE_TYPE_D3D11_ANGLE: egl::Int = 0x3208;

/// Display attributes: only the D3D11 renderer of ANGLE is supported.
pub const D3D11_DISPLAY_ATTRIBS: [egl::Int; 4] = [
    PLATFORM_ANGLE_TYPE_ANGLE,
    PLATFORM_ANGLE_TYPE_D3D11_ANGLE,
    egl::NONE,
    egl::NONE,
];

/// EGL version negotiated by [`initialize_display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayVersion {
    pub major: i32,
    pub minor: i32,
}

/// Opens the ANGLE display for the window's device context.
///
/// There is no fallback to `eglGetDisplay`: a missing platform extension or a
/// null display is [`ErrorKind::DisplayUnavailable`].
pub fn acquire_display<B: EglBackend>(
    backend: &B,
    window: NativeWindow,
) -> Result<B::Display, RenderError> {
    match backend.get_platform_display(PLATFORM_ANGLE_ANGLE, window, &D3D11_DISPLAY_ATTRIBS) {
        Ok(egl_display) => {
            debug!(?egl_display, device_context = window.device_context, "display acquired");
            Ok(egl_display)
        }
        Err(e @ EglError::MissingEntryPoint(_)) => Err(RenderError::new(
            ErrorKind::DisplayUnavailable,
            "acquire_display",
            "eglGetPlatformDisplayEXT is not available",
        )
        .with_egl(e)),
        Err(e) => Err(RenderError::new(
            ErrorKind::DisplayUnavailable,
            "acquire_display",
            "could not get display",
        )
        .with_egl(e)),
    }
}

/// Brings the display online. Called exactly once per display.
pub fn initialize_display<B: EglBackend>(
    backend: &B,
    display: B::Display,
) -> Result<DisplayVersion, RenderError> {
    let (major, minor) = backend.initialize(display).map_err(|e| {
        RenderError::new(
            ErrorKind::DisplayInitFailed,
            "initialize_display",
            "could not initialize display",
        )
        .with_egl(e)
    })?;
    info!(major, minor, "EGL display initialized");
    Ok(DisplayVersion { major, minor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d3d11_attribs_are_none_terminated() {
        assert_eq!(D3D11_DISPLAY_ATTRIBS[0], PLATFORM_ANGLE_TYPE_ANGLE);
        assert_eq!(D3D11_DISPLAY_ATTRIBS[1], PLATFORM_ANGLE_TYPE_D3D11_ANGLE);
        assert_eq!(D3D11_DISPLAY_ATTRIBS[2], egl::NONE);
    }
}
