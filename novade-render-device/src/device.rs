use std::fmt;
use std::sync::Arc;

use khronos_egl as egl;
use tracing::{debug, info, trace, warn};

use crate::backend::EglBackend;
use crate::context;
use crate::display::{self, DisplayVersion};
use crate::error::{EglError, ErrorKind, RenderError};
use crate::fault;
use crate::gl::GlFunctions;
use crate::negotiator::{self, DEFAULT_SAMPLE_COUNT};
use crate::surface::{self, SurfaceSize, SurfaceSlot, SurfaceTarget, DEFAULT_SWAP_INTERVAL};
use crate::target::{GpuContext, RenderTargetDescriptor};
use crate::window::{NativeWindow, WindowStyler};

/// A display connection, a context and one window surface bound to a native window.
///
/// All calls must come from the thread that issues the GPU draw calls:
/// "current" bindings are thread-local in EGL.
///
/// Dropping the device (or calling [`RenderDevice::dispose`]) unbinds the
/// context and releases context, surface and display, in that order.
pub struct RenderDevice<B: EglBackend> {
    backend: Arc<B>,
    window: NativeWindow,
    display: B::Display,
    version: DisplayVersion,
    surface_config: B::Config,
    context: B::Context,
    surface: SurfaceSlot<B::Surface>,
    functions: Arc<B::Functions>,
    swap_interval: egl::Int,
}

impl<B: EglBackend> RenderDevice<B> {
    /// Acquires display, config, context and a 0x0 placeholder surface, then
    /// resolves the GL function table.
    ///
    /// `styler` runs once, before the display is acquired, and only when
    /// `transparency` is requested. Nothing partially built survives a failure:
    /// whatever was acquired is released after the fault barrier has returned,
    /// so a driver that faults again during rollback cannot abort the process.
    pub fn create(
        backend: Arc<B>,
        window: NativeWindow,
        transparency: bool,
        styler: &dyn WindowStyler,
    ) -> Result<Self, RenderError> {
        let mut partial = Partial::default();
        let built = fault::guarded("create_device", || {
            Self::build(&*backend, window, transparency, styler, &mut partial)
        });

        let built = match built {
            Ok(built) => built,
            Err(e) => {
                if partial.display.is_some() {
                    debug!(error = %e, "releasing partially created render device");
                }
                partial.release(&*backend);
                return Err(e);
            }
        };

        info!(
            window = window.window,
            egl_major = built.version.major,
            egl_minor = built.version.minor,
            "render device created"
        );
        Ok(Self {
            backend,
            window,
            display: built.display,
            version: built.version,
            surface_config: built.surface_config,
            context: built.context,
            surface: built.surface,
            functions: built.functions,
            swap_interval: DEFAULT_SWAP_INTERVAL,
        })
    }

    /// Records every acquired object in `partial` until the last step succeeds.
    fn build(
        backend: &B,
        window: NativeWindow,
        transparency: bool,
        styler: &dyn WindowStyler,
        partial: &mut Partial<B>,
    ) -> Result<Built<B>, RenderError> {
        if transparency {
            styler.enable_transparency(window);
        }

        let display = display::acquire_display(backend, window)?;
        partial.display = Some(display);
        let version = display::initialize_display(backend, display)?;

        let surface_config = negotiator::choose_config(backend, display, DEFAULT_SAMPLE_COUNT)?;
        let context = context::create_context(backend, display, surface_config)?;
        partial.context = Some(context);

        let target = SurfaceTarget {
            backend,
            display,
            config: surface_config,
            context,
            window,
        };
        // A fresh EGL surface already swaps with interval 1.
        partial.surface.recreate(&target, 0, 0)?;

        let functions = Arc::new(backend.load_functions());

        partial.display = None;
        partial.context = None;
        Ok(Built {
            display,
            version,
            surface_config,
            context,
            surface: std::mem::take(&mut partial.surface),
            functions,
        })
    }

    fn target(&self) -> SurfaceTarget<'_, B> {
        SurfaceTarget {
            backend: &*self.backend,
            display: self.display,
            config: self.surface_config,
            context: self.context,
            window: self.window,
        }
    }

    /// Destroys the current surface and creates one of `width`x`height`, bound
    /// current with vsync on.
    ///
    /// On failure the device has no surface until the next successful call.
    pub fn create_or_resize_surface(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        let target = SurfaceTarget {
            backend: &*self.backend,
            display: self.display,
            config: self.surface_config,
            context: self.context,
            window: self.window,
        };
        if self.surface.recreate(&target, width, height)? {
            self.swap_interval = DEFAULT_SWAP_INTERVAL;
        }
        Ok(())
    }

    /// Re-binds this device's surface and context on the calling thread.
    pub fn bind_current(&self) -> Result<(), RenderError> {
        self.surface.bind_current(&self.target())
    }

    /// Resizes the surface and describes the framebuffer the 2D library should draw into.
    pub fn request_render_target(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<RenderTargetDescriptor, RenderError> {
        fault::guarded("create_render_target", || {
            self.create_or_resize_surface(width, height)?;
            let (w, h) = surface::egl_dimensions(width, height)?;
            self.functions.viewport(0, 0, w, h);
            let framebuffer_id = self.functions.framebuffer_binding();
            debug!(width, height, framebuffer_id, "render target ready");
            Ok(RenderTargetDescriptor::new(width, height, framebuffer_id))
        })
    }

    /// Presents the surface. The swap interval is set on every call.
    pub fn swap(&mut self, wait_for_vsync: bool) -> Result<(), RenderError> {
        fault::guarded("swap_buffers", || {
            let interval = if wait_for_vsync { 1 } else { 0 };
            match self.backend.swap_interval(self.display, interval) {
                Ok(()) => {
                    trace!(interval, "swap interval set");
                    self.swap_interval = interval;
                }
                Err(e) => warn!(interval, error = %e, "could not set swap interval"),
            }

            let surface = self.surface.current().ok_or_else(|| {
                RenderError::new(
                    ErrorKind::SwapFailed,
                    "swap_buffers",
                    "device has no surface; the last resize failed",
                )
            })?;
            self.backend.swap_buffers(self.display, surface).map_err(|e| {
                RenderError::new(
                    ErrorKind::SwapFailed,
                    "swap_buffers",
                    "could not complete eglSwapBuffers",
                )
                .with_egl(e)
            })
        })
    }

    /// Wraps the function table for the 2D rendering library.
    pub fn gpu_context(&self) -> GpuContext<B::Functions> {
        GpuContext::new(Arc::clone(&self.functions))
    }

    /// Releases everything this device owns.
    pub fn dispose(self) {
        debug!(window = self.window.window, "disposing render device");
        drop(self);
    }

    pub fn window(&self) -> NativeWindow {
        self.window
    }

    pub fn display_version(&self) -> DisplayVersion {
        self.version
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface.size()
    }

    /// `false` after a failed resize.
    pub fn has_surface(&self) -> bool {
        self.surface.current().is_some()
    }

    /// Interval installed by the last successful swap-interval change.
    pub fn swap_interval(&self) -> egl::Int {
        self.swap_interval
    }

    pub fn functions(&self) -> &Arc<B::Functions> {
        &self.functions
    }
}

impl<B: EglBackend> fmt::Debug for RenderDevice<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderDevice")
            .field("window", &self.window)
            .field("display", &self.display)
            .field("version", &self.version)
            .field("context", &self.context)
            .field("surface", &self.surface.current())
            .field("size", &self.surface.size())
            .field("swap_interval", &self.swap_interval)
            .finish()
    }
}

impl<B: EglBackend> Drop for RenderDevice<B> {
    fn drop(&mut self) {
        let surface = self.surface.take();
        release(&*self.backend, Some(self.display), Some(self.context), surface);
        info!(window = self.window.window, "render device released");
    }
}

/// Objects acquired so far by [`RenderDevice::build`].
///
/// Released explicitly by [`RenderDevice::create`] when construction fails.
struct Partial<B: EglBackend> {
    display: Option<B::Display>,
    context: Option<B::Context>,
    surface: SurfaceSlot<B::Surface>,
}

impl<B: EglBackend> Default for Partial<B> {
    fn default() -> Self {
        Self {
            display: None,
            context: None,
            surface: SurfaceSlot::default(),
        }
    }
}

impl<B: EglBackend> Partial<B> {
    fn release(&mut self, backend: &B) {
        let surface = self.surface.take();
        release(backend, self.display.take(), self.context.take(), surface);
    }
}

/// Everything a successful [`RenderDevice::build`] hands over.
struct Built<B: EglBackend> {
    display: B::Display,
    version: DisplayVersion,
    surface_config: B::Config,
    context: B::Context,
    surface: SurfaceSlot<B::Surface>,
    functions: Arc<B::Functions>,
}

/// Unbind, destroy context, destroy surface, terminate display. Best effort.
///
/// Each call runs behind its own fault barrier so one faulting call does not
/// skip the rest.
fn release<B: EglBackend>(
    backend: &B,
    display: Option<B::Display>,
    context: Option<B::Context>,
    surface: Option<B::Surface>,
) {
    let Some(egl_display) = display else {
        return;
    };

    if context.is_some() {
        release_step("unbind_context", || backend.make_current(egl_display, None, None, None));
    }
    if let Some(context) = context {
        release_step("destroy_context", || backend.destroy_context(egl_display, context));
    }
    if let Some(surface) = surface {
        release_step("destroy_surface", || backend.destroy_surface(egl_display, surface));
    }
    release_step("terminate_display", || backend.terminate(egl_display));
}

fn release_step(operation: &'static str, call: impl FnOnce() -> Result<(), EglError>) {
    match fault::trap(operation, call) {
        Ok(Ok(())) => trace!(operation, "released"),
        Ok(Err(e)) => warn!(operation, error = %e, "release call failed"),
        Err(e) => warn!(operation, error = %e, "release call faulted"),
    }
}
