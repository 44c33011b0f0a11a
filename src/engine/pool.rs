// src/engine/pool.rs
//
// Global worker pool for codec work, and the bridge that turns a blocking
// codec call into a future.
//
// Decode, encode and resize are CPU-bound. Running them inline would stall
// whatever executor is polling the handle, so every step is shipped to a
// rayon pool and the result comes back through a oneshot channel. The caller
// simply awaits; ordering between steps is the caller's `.await` order.
//
// Thread Count:
// - std::thread::available_parallelism() (respects cgroup/CPU quota)
// - MUTABLE_IMAGE_THREADS overrides it when set to a positive integer
// - Pool is initialized lazily on first use; later changes have NO effect

use crate::engine::common::catch_panic;
use crate::error::{MutableImageError, Result};
use futures::channel::oneshot;
use rayon::ThreadPool;
use std::sync::OnceLock;

/// Environment variable overriding the worker count
pub const THREADS_ENV: &str = "MUTABLE_IMAGE_THREADS";

/// Minimum number of rayon threads to ensure at least some parallelism
const MIN_THREADS: usize = 1;

static GLOBAL_THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();

pub fn get_pool() -> &'static ThreadPool {
    GLOBAL_THREAD_POOL.get_or_init(|| {
        let num_threads = configured_threads().unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(MIN_THREADS)
        });
        tracing::debug!(num_threads, "starting codec worker pool");

        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("mutable-image-{i}"))
            .build()
            .or_else(|e| {
                tracing::debug!(error = %e, "falling back to a single codec worker");
                rayon::ThreadPoolBuilder::new()
                    .num_threads(MIN_THREADS)
                    .build()
            })
            .unwrap_or_else(|e| panic!("failed to create codec worker pool: {e}"))
    })
}

fn configured_threads() -> Option<usize> {
    parse_threads(std::env::var(THREADS_ENV).ok()?.as_str())
}

fn parse_threads(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|&n| n >= MIN_THREADS)
}

/// Run `work` on the worker pool and await its result.
///
/// A panic inside `work` resolves to `InternalPanic`.
pub async fn defer<T, F>(label: &'static str, work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    get_pool().spawn(move || {
        // The receiver is gone if the awaiting future was dropped; nothing to do.
        let _ = tx.send(catch_panic(label, work));
    });

    match rx.await {
        Ok(outcome) => outcome,
        Err(oneshot::Canceled) => Err(MutableImageError::internal_panic(format!(
            "{label}: worker dropped its result"
        ))),
    }
}
