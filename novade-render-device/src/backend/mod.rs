//! The driver seam.
//!
//! [`EglBackend`] exposes exactly the EGL entry points the render device
//! needs, with each EGL object kind as an associated type. The production
//! implementation is [`AngleBackend`]; tests drive the device through an
//! instrumented implementation of the same trait.

use std::fmt::Debug;

use khronos_egl as egl;

use crate::error::EglError;
use crate::gl::GlFunctions;
use crate::window::NativeWindow;

mod angle;
pub use angle::AngleBackend;

/// EGL-shaped driver interface.
///
/// Every method is a blocking round trip into the driver. Implementations
/// report failures as [`EglError`] and never panic on ordinary failures; a
/// panic raised from inside a call is treated as a driver fault by
/// [`crate::fault::guarded`].
pub trait EglBackend {
    type Display: Copy + Debug;
    type Config: Copy + Debug;
    type Context: Copy + Debug;
    type Surface: Copy + Debug;
    /// GL function table resolved through the procedure-address resolver.
    type Functions: GlFunctions;

    /// Resolves `eglGetPlatformDisplayEXT` and calls it.
    ///
    /// Returns [`EglError::MissingEntryPoint`] when the extension function
    /// cannot be resolved.
    fn get_platform_display(
        &self,
        platform: egl::Enum,
        native_display: NativeWindow,
        attribs: &[egl::Int],
    ) -> Result<Self::Display, EglError>;

    fn initialize(&self, display: Self::Display) -> Result<(egl::Int, egl::Int), EglError>;

    /// Returns the first matching config, or `None` when nothing matches.
    fn choose_config(
        &self,
        display: Self::Display,
        attribs: &[egl::Int],
    ) -> Result<Option<Self::Config>, EglError>;

    fn create_context(
        &self,
        display: Self::Display,
        config: Self::Config,
        share: Option<Self::Context>,
        attribs: &[egl::Int],
    ) -> Result<Self::Context, EglError>;

    fn create_window_surface(
        &self,
        display: Self::Display,
        config: Self::Config,
        window: NativeWindow,
        attribs: &[egl::Int],
    ) -> Result<Self::Surface, EglError>;

    fn make_current(
        &self,
        display: Self::Display,
        draw: Option<Self::Surface>,
        read: Option<Self::Surface>,
        context: Option<Self::Context>,
    ) -> Result<(), EglError>;

    fn swap_interval(&self, display: Self::Display, interval: egl::Int) -> Result<(), EglError>;

    fn swap_buffers(&self, display: Self::Display, surface: Self::Surface) -> Result<(), EglError>;

    fn destroy_surface(&self, display: Self::Display, surface: Self::Surface) -> Result<(), EglError>;

    fn destroy_context(&self, display: Self::Display, context: Self::Context) -> Result<(), EglError>;

    fn terminate(&self, display: Self::Display) -> Result<(), EglError>;

    /// Resolves the GL function table. Requires a current context.
    fn load_functions(&self) -> Self::Functions;
}
