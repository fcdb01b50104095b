//! Window surface lifecycle.
//!
//! A device owns at most one window surface. Resizing destroys the current
//! surface before the replacement is created, because an EGL window can only
//! back a single window surface at a time. The consequence is that a failed
//! creation leaves the device without a surface until the next successful
//! resize; callers must not assume the previous surface survived.

use khronos_egl as egl;
use tracing::{debug, trace, warn};

use crate::backend::EglBackend;
use crate::error::{ErrorKind, RenderError};
use crate::window::NativeWindow;

/// `EGL_FIXED_SIZE_ANGLE`
pub const FIXED_SIZE_ANGLE: egl::Int = 0x3201;

const EGL_TRUE: egl::Int = 1;

/// Swap interval installed whenever a surface is (re)created.
pub const DEFAULT_SWAP_INTERVAL: egl::Int = 1;

/// Size of the current surface in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

/// Attributes of a fixed-size ANGLE window surface. 0x0 is a valid placeholder.
#[rustfmt::skip]
pub fn surface_attributes(width: egl::Int, height: egl::Int) -> [egl::Int; 8] {
    [
        FIXED_SIZE_ANGLE, EGL_TRUE,
        egl::WIDTH, width,
        egl::HEIGHT, height,
        egl::NONE, egl::NONE,
    ]
}

/// Converts a requested size to `EGLint` dimensions.
pub fn egl_dimensions(width: u32, height: u32) -> Result<(egl::Int, egl::Int), RenderError> {
    match (egl::Int::try_from(width), egl::Int::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(RenderError::new(
            ErrorKind::SurfaceCreationFailed,
            "create_surface",
            format!("surface size {width}x{height} exceeds the EGLint range"),
        )),
    }
}

/// Everything a surface needs from its device to be (re)created and bound.
pub(crate) struct SurfaceTarget<'a, B: EglBackend> {
    pub backend: &'a B,
    pub display: B::Display,
    pub config: B::Config,
    pub context: B::Context,
    pub window: NativeWindow,
}

impl<B: EglBackend> SurfaceTarget<'_, B> {
    fn make_current(&self, surface: Option<B::Surface>) -> Result<(), RenderError> {
        self.backend
            .make_current(self.display, surface, surface, Some(self.context))
            .map_err(|e| {
                RenderError::new(
                    ErrorKind::MakeCurrentFailed,
                    "make_current",
                    "could not make context current",
                )
                .with_egl(e)
            })
    }
}

/// The device's surface: Absent or Present.
pub(crate) struct SurfaceSlot<S> {
    current: Option<S>,
    size: SurfaceSize,
}

impl<S> Default for SurfaceSlot<S> {
    fn default() -> Self {
        Self {
            current: None,
            size: SurfaceSize::default(),
        }
    }
}

impl<S: Copy + std::fmt::Debug> SurfaceSlot<S> {
    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Leaves the slot Absent and hands the surface to the caller for teardown.
    pub fn take(&mut self) -> Option<S> {
        self.size = SurfaceSize::default();
        self.current.take()
    }

    /// Destroy-if-present, create `width`x`height`, bind current, vsync on.
    ///
    /// Returns whether [`DEFAULT_SWAP_INTERVAL`] was installed; a rejected
    /// `eglSwapInterval` is only logged.
    pub fn recreate<B>(
        &mut self,
        target: &SurfaceTarget<'_, B>,
        width: u32,
        height: u32,
    ) -> Result<bool, RenderError>
    where
        B: EglBackend<Surface = S>,
    {
        let (w, h) = egl_dimensions(width, height)?;

        if let Some(old) = self.take() {
            match target.backend.destroy_surface(target.display, old) {
                Ok(()) => trace!(surface = ?old, "previous surface destroyed"),
                Err(e) => warn!(surface = ?old, error = %e, "destroying previous surface failed"),
            }
        }

        let surface = target
            .backend
            .create_window_surface(target.display, target.config, target.window, &surface_attributes(w, h))
            .map_err(|e| {
                RenderError::new(
                    ErrorKind::SurfaceCreationFailed,
                    "create_surface",
                    format!("could not create {width}x{height} surface"),
                )
                .with_egl(e)
            })?;
        self.current = Some(surface);
        self.size = SurfaceSize { width, height };
        debug!(?surface, width, height, "window surface created");

        target.make_current(Some(surface))?;

        match target.backend.swap_interval(target.display, DEFAULT_SWAP_INTERVAL) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, "could not reset swap interval on new surface");
                Ok(false)
            }
        }
    }

    /// Re-binds the current surface and the device context on this thread.
    pub fn bind_current<B>(&self, target: &SurfaceTarget<'_, B>) -> Result<(), RenderError>
    where
        B: EglBackend<Surface = S>,
    {
        target.make_current(self.current)
    }
}
