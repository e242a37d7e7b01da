//! Panic boundary around ABE primitive calls.
//!
//! Pairing libraries are free to panic on malformed input. A panic must
//! never cross into ledger code, so every primitive call made by this crate
//! runs through [`guarded`], which turns a panic into
//! [`SchemeError::Fault`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use policygate_core::SchemeError;

/// Run `f`, converting a panic into a [`SchemeError::Fault`].
pub fn guarded<T, F>(operation: &'static str, f: F) -> Result<T, SchemeError>
where
    F: FnOnce() -> Result<T, SchemeError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::warn!(operation, %message, "primitive panicked");
            Err(SchemeError::Fault { operation, message })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
