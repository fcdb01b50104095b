//! Instrumented EGL backend shared by the integration tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell, RefMut};

use novade_render_device::fault::raise_native_fault;
use novade_render_device::{EglBackend, EglError, GlFunctions, NativeWindow};

pub fn window() -> NativeWindow {
    NativeWindow::new(0x1000, 0x2000)
}

/// Every call the device made, in order. Handles are the mock's object ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetPlatformDisplay { platform: u32, attribs: Vec<i32> },
    Initialize(u32),
    ChooseConfig(Vec<i32>),
    CreateContext { config: u32, attribs: Vec<i32> },
    CreateSurface { id: u32, width: i32, height: i32 },
    CreateSurfaceFailed { width: i32, height: i32 },
    MakeCurrent { surface: Option<u32>, context: Option<u32> },
    SwapInterval(i32),
    SwapBuffers(u32),
    DestroySurface(u32),
    DestroyContext(u32),
    Terminate(u32),
    LoadFunctions,
}

/// Failures and faults the mock should produce.
#[derive(Debug, Clone, Default)]
pub struct Script {
    pub missing_platform_extension: bool,
    pub initialize_fails: bool,
    pub no_matching_config: bool,
    pub context_creation_fails: bool,
    pub surface_creation_fails: bool,
    pub make_current_fails: bool,
    pub swap_interval_fails: bool,
    pub swap_fails: bool,
    pub fault_on_swap: Option<u32>,
    pub fault_on_surface_creation: Option<u32>,
    pub fault_on_destroy_context: Option<u32>,
    pub fault_on_terminate: Option<u32>,
    pub framebuffer_id: u32,
}

#[derive(Default)]
pub struct MockEgl {
    script: RefCell<Script>,
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    live_surfaces: RefCell<Vec<u32>>,
    peak_live_surfaces: Cell<usize>,
}

impl MockEgl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Script) -> Self {
        let mock = Self::default();
        *mock.script.borrow_mut() = script;
        mock
    }

    pub fn script_mut(&self) -> RefMut<'_, Script> {
        self.script.borrow_mut()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| pred(c)).count()
    }

    pub fn live_surfaces(&self) -> usize {
        self.live_surfaces.borrow().len()
    }

    pub fn peak_live_surfaces(&self) -> usize {
        self.peak_live_surfaces.get()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn next(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

/// Function table handed out by [`MockEgl::load_functions`].
#[derive(Debug, Default)]
pub struct MockGl {
    pub framebuffer_id: u32,
    pub viewports: RefCell<Vec<(i32, i32, i32, i32)>>,
}

impl GlFunctions for MockGl {
    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.viewports.borrow_mut().push((x, y, width, height));
    }

    fn framebuffer_binding(&self) -> u32 {
        self.framebuffer_id
    }
}

impl EglBackend for MockEgl {
    type Display = u32;
    type Config = u32;
    type Context = u32;
    type Surface = u32;
    type Functions = MockGl;

    fn get_platform_display(
        &self,
        platform: u32,
        _native_display: NativeWindow,
        attribs: &[i32],
    ) -> Result<u32, EglError> {
        self.record(Call::GetPlatformDisplay {
            platform,
            attribs: attribs.to_vec(),
        });
        if self.script.borrow().missing_platform_extension {
            return Err(EglError::MissingEntryPoint("eglGetPlatformDisplayEXT"));
        }
        Ok(self.next())
    }

    fn initialize(&self, display: u32) -> Result<(i32, i32), EglError> {
        self.record(Call::Initialize(display));
        if self.script.borrow().initialize_fails {
            return Err(EglError::Code(0x3001));
        }
        Ok((1, 5))
    }

    fn choose_config(&self, _display: u32, attribs: &[i32]) -> Result<Option<u32>, EglError> {
        self.record(Call::ChooseConfig(attribs.to_vec()));
        if self.script.borrow().no_matching_config {
            return Ok(None);
        }
        Ok(Some(self.next()))
    }

    fn create_context(
        &self,
        _display: u32,
        config: u32,
        _share: Option<u32>,
        attribs: &[i32],
    ) -> Result<u32, EglError> {
        self.record(Call::CreateContext {
            config,
            attribs: attribs.to_vec(),
        });
        if self.script.borrow().context_creation_fails {
            return Err(EglError::Code(0x3005));
        }
        Ok(self.next())
    }

    fn create_window_surface(
        &self,
        _display: u32,
        _config: u32,
        _window: NativeWindow,
        attribs: &[i32],
    ) -> Result<u32, EglError> {
        let (width, height) = (attribs[3], attribs[5]);
        let (fault, fails) = {
            let script = self.script.borrow();
            (script.fault_on_surface_creation, script.surface_creation_fails)
        };
        if let Some(code) = fault {
            raise_native_fault(code);
        }
        if fails {
            self.record(Call::CreateSurfaceFailed { width, height });
            return Err(EglError::Code(0x300B));
        }
        let id = self.next();
        self.record(Call::CreateSurface { id, width, height });
        let mut live = self.live_surfaces.borrow_mut();
        live.push(id);
        self.peak_live_surfaces.set(self.peak_live_surfaces.get().max(live.len()));
        Ok(id)
    }

    fn make_current(
        &self,
        _display: u32,
        draw: Option<u32>,
        _read: Option<u32>,
        context: Option<u32>,
    ) -> Result<(), EglError> {
        self.record(Call::MakeCurrent {
            surface: draw,
            context,
        });
        if context.is_some() && self.script.borrow().make_current_fails {
            return Err(EglError::Code(0x3006));
        }
        Ok(())
    }

    fn swap_interval(&self, _display: u32, interval: i32) -> Result<(), EglError> {
        self.record(Call::SwapInterval(interval));
        if self.script.borrow().swap_interval_fails {
            return Err(EglError::Code(0x3008));
        }
        Ok(())
    }

    fn swap_buffers(&self, _display: u32, surface: u32) -> Result<(), EglError> {
        let (fault, fails) = {
            let script = self.script.borrow();
            (script.fault_on_swap, script.swap_fails)
        };
        if let Some(code) = fault {
            raise_native_fault(code);
        }
        self.record(Call::SwapBuffers(surface));
        if fails {
            return Err(EglError::Code(0x300D));
        }
        Ok(())
    }

    fn destroy_surface(&self, _display: u32, surface: u32) -> Result<(), EglError> {
        self.record(Call::DestroySurface(surface));
        self.live_surfaces.borrow_mut().retain(|&s| s != surface);
        Ok(())
    }

    fn destroy_context(&self, _display: u32, context: u32) -> Result<(), EglError> {
        self.record(Call::DestroyContext(context));
        let fault = self.script.borrow().fault_on_destroy_context;
        if let Some(code) = fault {
            raise_native_fault(code);
        }
        Ok(())
    }

    fn terminate(&self, display: u32) -> Result<(), EglError> {
        self.record(Call::Terminate(display));
        let fault = self.script.borrow().fault_on_terminate;
        if let Some(code) = fault {
            raise_native_fault(code);
        }
        Ok(())
    }

    fn load_functions(&self) -> MockGl {
        self.record(Call::LoadFunctions);
        MockGl {
            framebuffer_id: self.script.borrow().framebuffer_id,
            viewports: RefCell::new(Vec::new()),
        }
    }
}
