use std::ffi::c_void;
use std::path::Path;

use khronos_egl as egl;
use tracing::{debug, info};

use super::EglBackend;
use crate::error::EglError;
use crate::window::NativeWindow;

#[cfg(windows)]
use crate::fault::raise_native_fault;

type GetPlatformDisplayExt =
    unsafe extern "system" fn(egl::Enum, *mut c_void, *const egl::Int) -> egl::EGLDisplay;

const GET_PLATFORM_DISPLAY_EXT: &str = "eglGetPlatformDisplayEXT";

/// [`EglBackend`] over ANGLE's `libEGL`, loaded at runtime.
///
/// All EGL entry points, the platform-display extension and the GL function
/// table are resolved through the same library instance.
pub struct AngleBackend {
    egl: egl::DynamicInstance<egl::EGL1_4>,
}

impl AngleBackend {
    /// Loads `libEGL` from `library`, or from the platform loader search path.
    pub fn load(library: Option<&Path>) -> Result<Self, EglError> {
        // SAFETY: loading a shared library runs its initializers; ANGLE's
        // libEGL has no initializer side effects beyond its own state.
        let egl = unsafe {
            match library {
                Some(path) => egl::DynamicInstance::<egl::EGL1_4>::load_required_from_filename(path),
                None => egl::DynamicInstance::<egl::EGL1_4>::load_required(),
            }
        }
        .map_err(|e| EglError::Load(e.to_string()))?;

        info!(library = ?library, "EGL library loaded");
        Ok(Self { egl })
    }

    fn last_error(&self) -> EglError {
        self.egl
            .get_error()
            .map_or(EglError::NoObject, |e| EglError::Code(e.native()))
    }
}

fn code(e: egl::Error) -> EglError {
    EglError::Code(e.native())
}

/// Runs one driver call behind a structured-exception frame.
///
/// An access violation or any other SEH exception raised inside libEGL or the
/// D3D driver is re-raised as a native fault carrying the exception code, for
/// [`crate::fault::guarded`] to turn into an error.
#[cfg(windows)]
fn trapped<R>(call: impl FnMut() -> R) -> R {
    match microseh::try_seh(call) {
        Ok(value) => value,
        Err(exception) => raise_native_fault(exception.code() as u32),
    }
}

/// Outside Windows there is no structured-exception frame to install: a
/// crashing driver call raises a signal and takes the process down.
#[cfg(not(windows))]
fn trapped<R>(mut call: impl FnMut() -> R) -> R {
    call()
}

impl EglBackend for AngleBackend {
    type Display = egl::Display;
    type Config = egl::Config;
    type Context = egl::Context;
    type Surface = egl::Surface;
    type Functions = glow::Context;

    fn get_platform_display(
        &self,
        platform: egl::Enum,
        native_display: NativeWindow,
        attribs: &[egl::Int],
    ) -> Result<egl::Display, EglError> {
        let proc = self
            .egl
            .get_proc_address(GET_PLATFORM_DISPLAY_EXT)
            .ok_or(EglError::MissingEntryPoint(GET_PLATFORM_DISPLAY_EXT))?;
        // SAFETY: eglGetPlatformDisplayEXT has exactly this signature in EGL_EXT_platform_base.
        let get_platform_display: GetPlatformDisplayExt = unsafe { std::mem::transmute(proc) };

        // SAFETY: attribs is EGL_NONE terminated by every caller in this crate.
        let raw = trapped(|| unsafe {
            get_platform_display(platform, native_display.device_context_ptr(), attribs.as_ptr())
        });
        if raw.is_null() {
            return Err(self.last_error());
        }
        debug!(platform, "platform display resolved");
        // SAFETY: raw is a non-null EGLDisplay returned by the driver.
        Ok(unsafe { egl::Display::from_ptr(raw) })
    }

    fn initialize(&self, display: egl::Display) -> Result<(egl::Int, egl::Int), EglError> {
        trapped(|| self.egl.initialize(display)).map_err(code)
    }

    fn choose_config(
        &self,
        display: egl::Display,
        attribs: &[egl::Int],
    ) -> Result<Option<egl::Config>, EglError> {
        trapped(|| self.egl.choose_first_config(display, attribs)).map_err(code)
    }

    fn create_context(
        &self,
        display: egl::Display,
        config: egl::Config,
        share: Option<egl::Context>,
        attribs: &[egl::Int],
    ) -> Result<egl::Context, EglError> {
        trapped(|| self.egl.create_context(display, config, share, attribs)).map_err(code)
    }

    fn create_window_surface(
        &self,
        display: egl::Display,
        config: egl::Config,
        window: NativeWindow,
        attribs: &[egl::Int],
    ) -> Result<egl::Surface, EglError> {
        // SAFETY: the window handle comes from the toolkit and outlives the device.
        trapped(|| unsafe {
            self.egl.create_window_surface(
                display,
                config,
                window.window_ptr() as egl::NativeWindowType,
                Some(attribs),
            )
        })
        .map_err(code)
    }

    fn make_current(
        &self,
        display: egl::Display,
        draw: Option<egl::Surface>,
        read: Option<egl::Surface>,
        context: Option<egl::Context>,
    ) -> Result<(), EglError> {
        trapped(|| self.egl.make_current(display, draw, read, context)).map_err(code)
    }

    fn swap_interval(&self, display: egl::Display, interval: egl::Int) -> Result<(), EglError> {
        trapped(|| self.egl.swap_interval(display, interval)).map_err(code)
    }

    fn swap_buffers(&self, display: egl::Display, surface: egl::Surface) -> Result<(), EglError> {
        trapped(|| self.egl.swap_buffers(display, surface)).map_err(code)
    }

    fn destroy_surface(&self, display: egl::Display, surface: egl::Surface) -> Result<(), EglError> {
        trapped(|| self.egl.destroy_surface(display, surface)).map_err(code)
    }

    fn destroy_context(&self, display: egl::Display, context: egl::Context) -> Result<(), EglError> {
        trapped(|| self.egl.destroy_context(display, context)).map_err(code)
    }

    fn terminate(&self, display: egl::Display) -> Result<(), EglError> {
        trapped(|| self.egl.terminate(display)).map_err(code)
    }

    fn load_functions(&self) -> glow::Context {
        // SAFETY: called with the device context current; unresolved names map to null.
        trapped(|| unsafe {
            glow::Context::from_loader_function(|name| {
                self.egl
                    .get_proc_address(name)
                    .map_or(std::ptr::null(), |f| f as *const c_void)
            })
        })
    }
}
