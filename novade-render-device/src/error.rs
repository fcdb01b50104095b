//! Error types for the render device.
//!
//! Every failure reaches the caller through [`RenderError`], which records the
//! [`ErrorKind`], a human readable message and the operation that produced it.
//! Backend level failures are described by [`EglError`] and attached as the
//! error source when they exist.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of a [`RenderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The platform display extension or the display itself is missing.
    DisplayUnavailable,
    /// `eglInitialize` rejected the display.
    DisplayInitFailed,
    /// No framebuffer configuration matched the requested attributes.
    NoMatchingConfig,
    /// The rendering context could not be created.
    ContextCreationFailed,
    /// The window surface could not be created.
    SurfaceCreationFailed,
    /// The surface/context pair could not be made current.
    MakeCurrentFailed,
    /// Presenting the surface failed.
    SwapFailed,
    /// A driver call faulted and was trapped by the fault barrier.
    NativeFault,
    /// A handle passed across the registry boundary is zero, stale or released.
    InvalidHandle,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::DisplayUnavailable => "display unavailable",
            ErrorKind::DisplayInitFailed => "display initialization failed",
            ErrorKind::NoMatchingConfig => "no matching config",
            ErrorKind::ContextCreationFailed => "context creation failed",
            ErrorKind::SurfaceCreationFailed => "surface creation failed",
            ErrorKind::MakeCurrentFailed => "make current failed",
            ErrorKind::SwapFailed => "swap failed",
            ErrorKind::NativeFault => "native fault",
            ErrorKind::InvalidHandle => "invalid handle",
        };
        f.write_str(name)
    }
}

/// Failure reported by an [`EglBackend`](crate::backend::EglBackend) call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EglError {
    /// The call failed and `eglGetError` reported this code.
    #[error("EGL error 0x{0:04X} ({})", code_name(.0))]
    Code(i32),

    /// The named entry point is not exported by the loaded EGL library.
    #[error("EGL entry point `{0}` is not available")]
    MissingEntryPoint(&'static str),

    /// The call returned a null object without recording an EGL error.
    #[error("EGL returned no object")]
    NoObject,

    /// The EGL library could not be loaded.
    #[error("failed to load EGL library: {0}")]
    Load(String),
}

fn code_name(code: &i32) -> &'static str {
    egl_error_name(*code)
}

/// Returns the symbolic name of an EGL error code.
pub fn egl_error_name(code: i32) -> &'static str {
    match code {
        0x3000 => "EGL_SUCCESS",
        0x3001 => "EGL_NOT_INITIALIZED",
        0x3002 => "EGL_BAD_ACCESS",
        0x3003 => "EGL_BAD_ALLOC",
        0x3004 => "EGL_BAD_ATTRIBUTE",
        0x3005 => "EGL_BAD_CONFIG",
        0x3006 => "EGL_BAD_CONTEXT",
        0x3007 => "EGL_BAD_CURRENT_SURFACE",
        0x3008 => "EGL_BAD_DISPLAY",
        0x3009 => "EGL_BAD_MATCH",
        0x300A => "EGL_BAD_NATIVE_PIXMAP",
        0x300B => "EGL_BAD_NATIVE_WINDOW",
        0x300C => "EGL_BAD_PARAMETER",
        0x300D => "EGL_BAD_SURFACE",
        0x300E => "EGL_CONTEXT_LOST",
        _ => "unknown EGL error",
    }
}

/// The single error channel of the crate.
#[derive(Error, Debug, Clone)]
#[error("{operation}: {message}")]
pub struct RenderError {
    kind: ErrorKind,
    operation: &'static str,
    message: String,
    #[source]
    egl: Option<EglError>,
    native_code: Option<u32>,
}

impl RenderError {
    pub fn new(kind: ErrorKind, operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            message: message.into(),
            egl: None,
            native_code: None,
        }
    }

    /// Builds a [`ErrorKind::NativeFault`] error carrying the trapped fault code.
    pub fn native_fault(operation: &'static str, code: u32) -> Self {
        Self {
            kind: ErrorKind::NativeFault,
            operation,
            message: format!("native fault 0x{code:08X} inside a driver call"),
            egl: None,
            native_code: Some(code),
        }
    }

    pub fn invalid_handle(operation: &'static str, what: &str, raw: u64) -> Self {
        Self::new(
            ErrorKind::InvalidHandle,
            operation,
            format!("{what} handle 0x{raw:016X} does not refer to a live object"),
        )
    }

    /// Attaches the backend failure that caused this error.
    pub fn with_egl(mut self, egl: EglError) -> Self {
        self.egl = Some(egl);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn egl_error(&self) -> Option<&EglError> {
        self.egl.as_ref()
    }

    /// Native fault code, present only for [`ErrorKind::NativeFault`].
    pub fn native_code(&self) -> Option<u32> {
        self.native_code
    }
}

/// Errors raised while loading or validating [`RenderDeviceConfig`](crate::config::RenderDeviceConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

/// Errors raised while installing the global tracing subscriber.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter `{filter}`: {reason}")]
    Filter { filter: String, reason: String },

    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_includes_operation_and_message() {
        let err = RenderError::new(ErrorKind::SwapFailed, "swap_buffers", "could not complete eglSwapBuffers");
        assert_eq!(err.to_string(), "swap_buffers: could not complete eglSwapBuffers");
        assert_eq!(err.kind(), ErrorKind::SwapFailed);
        assert!(err.native_code().is_none());
    }

    #[test]
    fn egl_error_is_exposed_as_source() {
        let err = RenderError::new(ErrorKind::ContextCreationFailed, "create_context", "could not create context")
            .with_egl(EglError::Code(0x3005));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("EGL error 0x3005 (EGL_BAD_CONFIG)"));
    }

    #[test]
    fn native_fault_carries_code() {
        let err = RenderError::native_fault("swap_buffers", 0xC000_0005);
        assert_eq!(err.kind(), ErrorKind::NativeFault);
        assert_eq!(err.native_code(), Some(0xC000_0005));
        assert!(err.message().contains("0xC0000005"));
    }

    #[test]
    fn unknown_egl_codes_have_a_fallback_name() {
        assert_eq!(egl_error_name(0x1234), "unknown EGL error");
        assert_eq!(egl_error_name(0x300E), "EGL_CONTEXT_LOST");
    }
}
