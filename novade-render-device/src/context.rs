//! Rendering context creation.

use khronos_egl as egl;
use tracing::info;

use crate::backend::EglBackend;
use crate::error::{ErrorKind, RenderError};

/// `EGL_CONTEXT_MAJOR_VERSION`
pub const CONTEXT_MAJOR_VERSION: egl::Int = 0x3098;
/// `EGL_CONTEXT_MINOR_VERSION`
pub const CONTEXT_MINOR_VERSION: egl::Int = 0x30FB;

/// The only API tier requested: OpenGL ES 3.0.
#[rustfmt::skip]
pub const CONTEXT_ATTRIBS: [egl::Int; 6] = [
    CONTEXT_MAJOR_VERSION, 3,
    CONTEXT_MINOR_VERSION, 0,
    egl::NONE, egl::NONE,
];

/// Creates an unshared ES 3.0 context for `config`. The context is not made current.
pub fn create_context<B: EglBackend>(
    backend: &B,
    display: B::Display,
    config: B::Config,
) -> Result<B::Context, RenderError> {
    let context = backend
        .create_context(display, config, None, &CONTEXT_ATTRIBS)
        .map_err(|e| {
            RenderError::new(
                ErrorKind::ContextCreationFailed,
                "create_context",
                "could not create context",
            )
            .with_egl(e)
        })?;
    info!(?context, "ES 3.0 context created");
    Ok(context)
}
