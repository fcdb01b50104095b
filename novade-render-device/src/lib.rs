//! EGL rendering-surface lifecycle for NovaDE windows.
//!
//! A [`RenderDevice`] binds a native window to an ANGLE (D3D11) EGL display,
//! an OpenGL ES 3.0 context and one resizable window surface, and hands the
//! GL function table and framebuffer description to a 2D rendering library.
//! [`DeviceRegistry`] exposes the same operations through opaque integer
//! handles for hosts living in another runtime.
//!
//! Creation order is display, config, context, surface, function table.
//! Teardown is unbind, context, surface, display.

pub mod backend;
pub mod config;
pub mod context;
pub mod display;
pub mod error;
pub mod fault;
pub mod gl;
pub mod logging;
pub mod negotiator;
pub mod surface;
pub mod target;
pub mod window;

mod device;
mod registry;

pub use backend::{AngleBackend, EglBackend};
pub use config::{ConfigLoader, LoggingConfig, RenderDeviceConfig};
pub use device::RenderDevice;
pub use display::DisplayVersion;
pub use error::{ConfigError, EglError, ErrorKind, LoggingError, RenderError};
pub use gl::GlFunctions;
pub use registry::{DeviceHandle, DeviceRegistry, GpuContextHandle, RenderTargetHandle};
pub use surface::SurfaceSize;
pub use target::{GpuContext, RenderTargetDescriptor};
pub use window::{NativeWindow, NoopStyler, WindowStyler};
