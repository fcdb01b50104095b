//! Handle arena for hosting layers.
//!
//! Callers in another runtime keep plain `u64` handles. Each handle indexes a
//! `slotmap` arena owned by [`DeviceRegistry`], so a stale or forged handle is
//! detected on lookup instead of being dereferenced. Handle `0` is never issued.

use std::sync::Arc;

use slotmap::{Key, KeyData, SlotMap};
use tracing::{debug, info};

use crate::backend::{AngleBackend, EglBackend};
use crate::config::RenderDeviceConfig;
use crate::device::RenderDevice;
use crate::error::{ErrorKind, RenderError};
use crate::target::{GpuContext, RenderTargetDescriptor};
use crate::window::{NativeWindow, NoopStyler, WindowStyler};

slotmap::new_key_type! {
    struct DeviceKey;
    struct GpuContextKey;
    struct RenderTargetKey;
}

macro_rules! raw_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(transparent)]
        pub struct $name(u64);

        impl $name {
            /// The handle returned alongside an error; never refers to anything.
            pub const NULL: Self = Self(0);

            pub fn as_raw(self) -> u64 {
                self.0
            }

            pub fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            pub fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

raw_handle!(
    /// Opaque handle to a [`RenderDevice`] in a [`DeviceRegistry`].
    DeviceHandle
);
raw_handle!(
    /// Opaque handle to a [`GpuContext`] in a [`DeviceRegistry`].
    GpuContextHandle
);
raw_handle!(
    /// Opaque handle to a [`RenderTargetDescriptor`] in a [`DeviceRegistry`].
    RenderTargetHandle
);

fn to_raw<K: Key>(key: K) -> u64 {
    key.data().as_ffi()
}

fn to_key<K: Key>(raw: u64) -> Option<K> {
    (raw != 0).then(|| KeyData::from_ffi(raw).into())
}

/// An object owned by one device; disposed together with it.
struct Owned<T> {
    device: DeviceKey,
    value: T,
}

/// Owns every device, GPU context and render target created through it.
///
/// GPU contexts and render targets belong to the device they were created
/// from: disposing the device releases them, and their handles then report
/// [`ErrorKind::InvalidHandle`].
pub struct DeviceRegistry<B: EglBackend> {
    backend: Arc<B>,
    styler: Box<dyn WindowStyler>,
    devices: SlotMap<DeviceKey, RenderDevice<B>>,
    gpu_contexts: SlotMap<GpuContextKey, Owned<GpuContext<B::Functions>>>,
    render_targets: SlotMap<RenderTargetKey, Owned<RenderTargetDescriptor>>,
}

impl DeviceRegistry<AngleBackend> {
    /// Loads ANGLE's libEGL as configured and builds an empty registry.
    pub fn from_config(config: &RenderDeviceConfig) -> Result<Self, RenderError> {
        let backend = AngleBackend::load(config.egl_library.as_deref()).map_err(|e| {
            RenderError::new(
                ErrorKind::DisplayUnavailable,
                "load_backend",
                "could not load the EGL library",
            )
            .with_egl(e)
        })?;
        Ok(Self::new(Arc::new(backend)))
    }
}

impl<B: EglBackend> DeviceRegistry<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self::with_styler(backend, NoopStyler)
    }

    pub fn with_styler(backend: Arc<B>, styler: impl WindowStyler + 'static) -> Self {
        Self {
            backend,
            styler: Box::new(styler),
            devices: SlotMap::with_key(),
            gpu_contexts: SlotMap::with_key(),
            render_targets: SlotMap::with_key(),
        }
    }

    pub fn create_device(
        &mut self,
        window: NativeWindow,
        transparency: bool,
    ) -> Result<DeviceHandle, RenderError> {
        let device = RenderDevice::create(Arc::clone(&self.backend), window, transparency, &*self.styler)?;
        let handle = DeviceHandle(to_raw(self.devices.insert(device)));
        info!(handle = handle.as_raw(), "device registered");
        Ok(handle)
    }

    pub fn bind_current(&self, handle: DeviceHandle) -> Result<(), RenderError> {
        self.device_ref("bind_current", handle)?.bind_current()
    }

    /// Wraps the device's function table for the 2D rendering library.
    pub fn create_gpu_context(&mut self, handle: DeviceHandle) -> Result<GpuContextHandle, RenderError> {
        let (device, context) = self.device_entry("create_gpu_context", handle)?;
        let value = context.gpu_context();
        Ok(GpuContextHandle(to_raw(self.gpu_contexts.insert(Owned { device, value }))))
    }

    pub fn create_render_target(
        &mut self,
        handle: DeviceHandle,
        width: u32,
        height: u32,
    ) -> Result<RenderTargetHandle, RenderError> {
        let device = self.device_key("create_render_target", handle)?;
        let value = self
            .device_mut("create_render_target", handle)?
            .request_render_target(width, height)?;
        Ok(RenderTargetHandle(to_raw(self.render_targets.insert(Owned { device, value }))))
    }

    pub fn swap_buffers(&mut self, handle: DeviceHandle, wait_for_vsync: bool) -> Result<(), RenderError> {
        self.device_mut("swap_buffers", handle)?.swap(wait_for_vsync)
    }

    /// Disposes the device together with its GPU contexts and render targets.
    /// Disposing the same handle twice is reported as [`ErrorKind::InvalidHandle`].
    pub fn dispose_device(&mut self, handle: DeviceHandle) -> Result<(), RenderError> {
        let key = self.device_key("dispose_device", handle)?;
        let device = self
            .devices
            .remove(key)
            .ok_or_else(|| RenderError::invalid_handle("dispose_device", "device", handle.as_raw()))?;

        let contexts = self.gpu_contexts.len();
        let targets = self.render_targets.len();
        self.gpu_contexts.retain(|_, owned| owned.device != key);
        self.render_targets.retain(|_, owned| owned.device != key);

        device.dispose();
        debug!(
            handle = handle.as_raw(),
            gpu_contexts = contexts - self.gpu_contexts.len(),
            render_targets = targets - self.render_targets.len(),
            "device unregistered"
        );
        Ok(())
    }

    pub fn device(&self, handle: DeviceHandle) -> Option<&RenderDevice<B>> {
        to_key::<DeviceKey>(handle.as_raw()).and_then(|key| self.devices.get(key))
    }

    pub fn gpu_context(&self, handle: GpuContextHandle) -> Option<&GpuContext<B::Functions>> {
        to_key::<GpuContextKey>(handle.as_raw())
            .and_then(|key| self.gpu_contexts.get(key))
            .map(|owned| &owned.value)
    }

    pub fn render_target(&self, handle: RenderTargetHandle) -> Option<&RenderTargetDescriptor> {
        to_key::<RenderTargetKey>(handle.as_raw())
            .and_then(|key| self.render_targets.get(key))
            .map(|owned| &owned.value)
    }

    pub fn release_gpu_context(&mut self, handle: GpuContextHandle) -> Result<(), RenderError> {
        to_key::<GpuContextKey>(handle.as_raw())
            .and_then(|key| self.gpu_contexts.remove(key))
            .map(drop)
            .ok_or_else(|| RenderError::invalid_handle("release_gpu_context", "GPU context", handle.as_raw()))
    }

    pub fn release_render_target(&mut self, handle: RenderTargetHandle) -> Result<(), RenderError> {
        to_key::<RenderTargetKey>(handle.as_raw())
            .and_then(|key| self.render_targets.remove(key))
            .map(drop)
            .ok_or_else(|| RenderError::invalid_handle("release_render_target", "render target", handle.as_raw()))
    }

    /// Number of live devices.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device_ref(&self, operation: &'static str, handle: DeviceHandle) -> Result<&RenderDevice<B>, RenderError> {
        self.device(handle)
            .ok_or_else(|| RenderError::invalid_handle(operation, "device", handle.as_raw()))
    }

    /// Key of a live device.
    fn device_key(&self, operation: &'static str, handle: DeviceHandle) -> Result<DeviceKey, RenderError> {
        to_key::<DeviceKey>(handle.as_raw())
            .filter(|key| self.devices.contains_key(*key))
            .ok_or_else(|| RenderError::invalid_handle(operation, "device", handle.as_raw()))
    }

    fn device_entry(
        &self,
        operation: &'static str,
        handle: DeviceHandle,
    ) -> Result<(DeviceKey, &RenderDevice<B>), RenderError> {
        let key = self.device_key(operation, handle)?;
        Ok((key, self.device_ref(operation, handle)?))
    }

    fn device_mut(
        &mut self,
        operation: &'static str,
        handle: DeviceHandle,
    ) -> Result<&mut RenderDevice<B>, RenderError> {
        to_key::<DeviceKey>(handle.as_raw())
            .and_then(|key| self.devices.get_mut(key))
            .ok_or_else(|| RenderError::invalid_handle(operation, "device", handle.as_raw()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handle_never_maps_to_a_key() {
        assert!(to_key::<DeviceKey>(0).is_none());
        assert!(DeviceHandle::NULL.is_null());
    }

    #[test]
    fn keys_round_trip_through_raw_handles() {
        let mut arena: SlotMap<DeviceKey, u8> = SlotMap::with_key();
        let key = arena.insert(1);
        let raw = to_raw(key);
        assert_ne!(raw, 0);
        assert_eq!(to_key::<DeviceKey>(raw), Some(key));
    }

    #[test]
    fn removed_keys_do_not_resolve() {
        let mut arena: SlotMap<DeviceKey, u8> = SlotMap::with_key();
        let key = arena.insert(1);
        let raw = to_raw(key);
        arena.remove(key);
        let stale = to_key::<DeviceKey>(raw).and_then(|k| arena.get(k));
        assert!(stale.is_none());
    }
}
