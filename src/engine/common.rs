// src/engine/common.rs
//
// Common utilities shared across engine modules.

use crate::error::{MutableImageError, Result};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Run `work`, turning a panic inside a codec library into `InternalPanic`.
///
/// Codec crates wrap C libraries (libjpeg-turbo, libwebp) whose Rust bindings
/// may panic on malformed input; a panic must never escape to the caller.
pub fn run_with_panic_policy<T, F>(label: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    catch_panic(label, work)?
}

/// Like [`run_with_panic_policy`] for work that does not itself return a Result.
pub fn catch_panic<T, F>(label: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> T,
{
    catch_unwind(AssertUnwindSafe(work)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::debug!(label, %message, "codec panicked");
        MutableImageError::internal_panic(format!("{label}: {message}"))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
