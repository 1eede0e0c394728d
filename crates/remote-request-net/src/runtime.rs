//! The shared background runtime.
//!
//! Executors built outside a tokio context run their network I/O here.

use std::future::Future;
use std::io;
use std::sync::OnceLock;

use parking_lot::{Mutex, const_mutex};
use tokio::runtime::{Handle, Runtime};

static RUNTIME: OnceLock<Runtime> = OnceLock::new();
static INIT: Mutex<()> = const_mutex(());

/// Worker threads of the background runtime.
pub const WORKER_THREADS: usize = 2;

/// Get the background runtime, creating it on first use.
pub fn get() -> io::Result<&'static Runtime> {
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }

    let _init = INIT.lock();
    if let Some(runtime) = RUNTIME.get() {
        return Ok(runtime);
    }
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(WORKER_THREADS)
        .thread_name("remote-request-io")
        .enable_all()
        .build()?;
    tracing::debug!(target: "remote_request_net::runtime", workers = WORKER_THREADS, "Background runtime started");
    Ok(RUNTIME.get_or_init(|| runtime))
}

/// The runtime to spawn on: the caller's, if inside one, else the
/// background runtime.
pub fn current_or_background() -> io::Result<Handle> {
    match Handle::try_current() {
        Ok(handle) => Ok(handle),
        Err(_) => get().map(|runtime| runtime.handle().clone()),
    }
}

/// Block on a future using the background runtime.
///
/// Do not call this from within an async context; it blocks the thread.
pub fn block_on<F: Future>(future: F) -> io::Result<F::Output> {
    Ok(get()?.block_on(future))
}
