//! Fault barrier around driver-facing operations.
//!
//! A driver fault raised inside a backend call unwinds as a [`NativeFault`]
//! payload. [`guarded`] stops that unwind at the operation boundary and turns
//! it into a [`ErrorKind::NativeFault`](crate::ErrorKind::NativeFault) error, so
//! a crashing driver call costs one failed operation instead of the process.
//!
//! The barrier never runs backend calls from a destructor while an unwind is
//! in flight: cleanup after a fault happens once [`trap`] has returned, and
//! each cleanup call sits behind its own barrier.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use tracing::error;

use crate::error::RenderError;

/// Code reported when a call unwinds without a native fault code attached.
pub const UNKNOWN_FAULT_CODE: u32 = 0xE000_0001;

/// Unwind payload describing a fault trapped inside a driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeFault {
    pub code: u32,
}

/// Raises a driver fault from inside a backend call.
///
/// Backends that trap platform faults (structured exceptions, signals) report
/// them through this function so that the enclosing [`guarded`] call sees them.
pub fn raise_native_fault(code: u32) -> ! {
    install_quiet_hook();
    panic::panic_any(NativeFault { code })
}

fn is_native_fault(payload: &(dyn Any + Send)) -> bool {
    payload.is::<NativeFault>()
}

static QUIET_HOOK: Once = Once::new();

/// Chains a panic hook that stays silent for [`NativeFault`] payloads; they are
/// logged through `tracing` by the barrier instead. Other panics reach the
/// previously installed hook unchanged.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !is_native_fault(info.payload()) {
                previous(info);
            }
        }));
    });
}

/// Runs `call` behind the fault barrier and returns its value.
///
/// Any unwind becomes a `NativeFault` error: a [`NativeFault`] payload keeps
/// its code, anything else (and a zero code) is reported as
/// [`UNKNOWN_FAULT_CODE`].
pub fn trap<T>(operation: &'static str, call: impl FnOnce() -> T) -> Result<T, RenderError> {
    panic::catch_unwind(AssertUnwindSafe(call)).map_err(|payload| {
        let code = match payload.downcast_ref::<NativeFault>() {
            Some(fault) if fault.code != 0 => fault.code,
            _ => UNKNOWN_FAULT_CODE,
        };
        error!(operation, code = format_args!("0x{code:08X}"), "driver fault trapped");
        RenderError::native_fault(operation, code)
    })
}

/// Runs a fallible `call` behind the fault barrier.
///
/// Ordinary errors pass through unchanged. State mutated by `call` before a
/// fault is left as it was at the faulting call.
pub fn guarded<T>(
    operation: &'static str,
    call: impl FnOnce() -> Result<T, RenderError>,
) -> Result<T, RenderError> {
    trap(operation, call)?
}
