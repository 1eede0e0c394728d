//! A serial work queue backed by a dedicated thread.

use std::io;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use crossbeam_channel::{Sender, bounded, unbounded};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs closures one at a time, in submission order, on its own thread.
///
/// Handles are cheap to clone. The thread exits once every handle is gone and
/// the remaining jobs have run.
#[derive(Clone)]
pub struct SerialQueue {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    label: String,
    sender: Sender<Job>,
    thread_id: ThreadId,
}

impl SerialQueue {
    /// Start a queue whose thread is named `label`.
    pub fn new(label: impl Into<String>) -> io::Result<Self> {
        let label = label.into();
        let (sender, receiver) = unbounded::<Job>();

        let handle = thread::Builder::new().name(label.clone()).spawn(move || {
            while let Ok(job) = receiver.recv() {
                job();
            }
        })?;
        let thread_id = handle.thread().id();

        tracing::trace!(target: "remote_request_net::reachability", label = %label, "Serial queue started");

        Ok(Self {
            inner: Arc::new(QueueInner {
                label,
                sender,
                thread_id,
            }),
        })
    }

    /// The queue's label.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Whether the calling thread is this queue's thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.inner.thread_id
    }

    /// Enqueue `job` without waiting for it.
    ///
    /// Returns `false` if the queue thread is gone.
    pub fn dispatch<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.sender.send(Box::new(job)).is_ok()
    }

    /// Run `job` on the queue and wait for its result.
    ///
    /// Runs inline when called from the queue's own thread. Returns `None` if
    /// the queue thread is gone.
    pub fn sync<F, R>(&self, job: F) -> Option<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.is_current() {
            return Some(job());
        }

        let (tx, rx) = bounded(1);
        if !self.dispatch(move || {
            let _ = tx.send(job());
        }) {
            return None;
        }
        rx.recv().ok()
    }
}

impl std::fmt::Debug for SerialQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialQueue")
            .field("label", &self.inner.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn test_jobs_run_in_order() {
        let queue = SerialQueue::new("test-serial-queue").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..10 {
            let seen = seen.clone();
            assert!(queue.dispatch(move || seen.lock().push(i)));
        }
        queue.sync(|| ()).unwrap();
        assert_eq!(*seen.lock(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_sync_returns_value_and_runs_on_queue() {
        let queue = SerialQueue::new("test-sync").unwrap();
        let inner = queue.clone();
        assert_eq!(queue.sync(move || inner.is_current()), Some(true));
        assert!(!queue.is_current());
    }

    #[test]
    fn test_nested_sync_runs_inline() {
        let queue = SerialQueue::new("test-nested").unwrap();
        let inner = queue.clone();
        let value = queue.sync(move || inner.sync(|| 7)).flatten();
        assert_eq!(value, Some(7));
    }
}
