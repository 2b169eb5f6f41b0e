//! Tokio runtime behind the blocking API
//!
//! The synchronous caller drives the async one on a shared multi-thread
//! runtime that is created the first time it is needed.

use dbcall_core::{CallError, Result};
use std::sync::OnceLock;
use tokio::runtime::Runtime;

static TOKIO_RUNTIME: OnceLock<std::io::Result<Runtime>> = OnceLock::new();

/// Get or create the shared Tokio runtime.
///
/// Fails with `CallError::Runtime` if the runtime could not be built; the
/// failure is remembered and reported to every later caller.
pub fn get_tokio_runtime() -> Result<&'static Runtime> {
    TOKIO_RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .thread_name("dbcall-runtime")
                .build()
        })
        .as_ref()
        .map_err(|e| CallError::Runtime(e.to_string()))
}

/// Run a future to completion on the shared Tokio runtime.
///
/// This blocks the current thread until the future completes. It must not be
/// called from within an async context, where blocking would stall the
/// executor (Tokio panics in that case).
pub fn block_on_tokio<F, T>(future: F) -> Result<T>
where
    F: std::future::Future<Output = T>,
{
    Ok(get_tokio_runtime()?.block_on(future))
}
