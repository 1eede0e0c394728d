//! Reachability change monitoring.

use std::sync::{Arc, Weak};

use super::flags::ReachabilityFlags;
use super::provider::{FlagsCallback, ReachabilityProvider};
use super::queue::SerialQueue;
use super::status::{ConnectionType, ReachabilityStatus};
use super::system::SystemReachability;
use crate::error::ReachabilityError;
use crate::protected::ProtectedState;

/// Label of the monitor's internal queue thread.
pub const REACHABILITY_QUEUE_LABEL: &str = "remote-request-reachability";

/// Closure called with each new status.
pub type Listener = Arc<dyn Fn(ReachabilityStatus) + Send + Sync>;

/// Where a listener runs.
#[derive(Clone, Debug)]
pub enum ListenerContext {
    /// On the monitor's own reachability queue.
    Inline,
    /// On the given serial queue, in event order.
    Queue(SerialQueue),
    /// As a task on a tokio runtime. Tasks may run out of order.
    Runtime(tokio::runtime::Handle),
}

impl ListenerContext {
    fn dispatch(&self, listener: Listener, status: ReachabilityStatus) {
        match self {
            Self::Inline => listener(status),
            Self::Queue(queue) => {
                queue.dispatch(move || listener(status));
            }
            Self::Runtime(handle) => {
                handle.spawn(async move { listener(status) });
            }
        }
    }
}

#[derive(Default)]
struct MonitorState {
    listener: Option<Listener>,
    context: Option<ListenerContext>,
    previous_status: Option<ReachabilityStatus>,
}

/// Watches reachability flags and tells a listener when the derived
/// [`ReachabilityStatus`] changes.
///
/// Repeated events with the same status reach the listener once. The provider
/// only holds a weak reference to the monitor, and dropping the monitor stops
/// listening.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use remote_request_net::reachability::{
///     ConnectivityMonitor, ListenerContext, ManualReachability, ReachabilityFlags,
/// };
///
/// let provider = Arc::new(ManualReachability::with_flags(ReachabilityFlags::REACHABLE));
/// let monitor = ConnectivityMonitor::with_provider(provider.clone()).unwrap();
///
/// assert!(monitor.start_listening(ListenerContext::Inline, |status| {
///     println!("Reachability: {status}");
/// }));
/// provider.push(ReachabilityFlags::empty());
/// monitor.stop_listening();
/// ```
pub struct ConnectivityMonitor {
    provider: Arc<dyn ReachabilityProvider>,
    queue: SerialQueue,
    state: ProtectedState<MonitorState>,
    this: Weak<ConnectivityMonitor>,
}

impl ConnectivityMonitor {
    /// Monitor the host's network interfaces.
    pub fn system() -> Result<Arc<Self>, ReachabilityError> {
        Self::with_provider(Arc::new(SystemReachability::new()))
    }

    /// Monitor flags reported by `provider`.
    pub fn with_provider(provider: Arc<dyn ReachabilityProvider>) -> Result<Arc<Self>, ReachabilityError> {
        let queue = SerialQueue::new(REACHABILITY_QUEUE_LABEL).map_err(ReachabilityError::Spawn)?;
        Ok(Arc::new_cyclic(|this| Self {
            provider,
            queue,
            state: ProtectedState::default(),
            this: this.clone(),
        }))
    }

    /// Current flags, if the provider can determine them.
    pub fn flags(&self) -> Option<ReachabilityFlags> {
        self.provider.flags()
    }

    /// Current status derived from live flags.
    pub fn status(&self) -> ReachabilityStatus {
        ReachabilityStatus::from_optional_flags(self.flags())
    }

    /// Reachable over any connection.
    pub fn is_reachable(&self) -> bool {
        self.is_reachable_on_cellular() || self.is_reachable_on_ethernet_or_wifi()
    }

    /// Reachable over cellular.
    pub fn is_reachable_on_cellular(&self) -> bool {
        self.status() == ReachabilityStatus::Reachable(ConnectionType::Cellular)
    }

    /// Reachable over Ethernet or Wi-Fi.
    pub fn is_reachable_on_ethernet_or_wifi(&self) -> bool {
        self.status() == ReachabilityStatus::Reachable(ConnectionType::EthernetOrWifi)
    }

    /// Whether a listener is installed.
    pub fn is_listening(&self) -> bool {
        self.state.read(|state| state.listener.is_some())
    }

    /// The monitor's reachability queue.
    pub fn queue(&self) -> &SerialQueue {
        &self.queue
    }

    /// Replace the listener and start delivering status changes to it.
    ///
    /// Any previous listener is removed first. If flags are available, one
    /// evaluation runs right away on the reachability queue. Returns `false`
    /// if the provider refused the callback or the queue.
    pub fn start_listening<F>(&self, context: ListenerContext, listener: F) -> bool
    where
        F: Fn(ReachabilityStatus) + Send + Sync + 'static,
    {
        self.stop_listening();

        self.state.write(|state| {
            state.listener = Some(Arc::new(listener));
            state.context = Some(context);
        });

        let this = self.this.clone();
        let callback: FlagsCallback = Arc::new(move |flags| {
            if let Some(monitor) = this.upgrade() {
                monitor.notify_listener(flags);
            }
        });
        let callback_added = self.provider.set_callback(Some(callback));
        let queue_added = self.provider.set_dispatch_queue(Some(self.queue.clone()));

        let this = self.this.clone();
        self.queue.dispatch(move || {
            if let Some(monitor) = this.upgrade()
                && let Some(flags) = monitor.flags()
            {
                monitor.notify_listener(flags);
            }
        });

        if !(callback_added && queue_added) {
            tracing::warn!(
                target: "remote_request_net::reachability",
                callback_added,
                queue_added,
                "Reachability provider rejected the listener"
            );
        }
        callback_added && queue_added
    }

    /// Detach from the provider and forget the listener and last status.
    ///
    /// Safe to call any number of times.
    pub fn stop_listening(&self) {
        self.provider.set_callback(None);
        self.provider.set_dispatch_queue(None);
        self.state.set(MonitorState::default());
    }

    fn notify_listener(&self, flags: ReachabilityFlags) {
        let status = ReachabilityStatus::from_flags(flags);
        tracing::debug!(
            target: "remote_request_net::reachability",
            flags = %flags.readable_description(),
            status = %status,
            "Reachability flags changed"
        );

        let inline = self.state.write(|state| {
            if state.previous_status == Some(status) {
                return None;
            }
            state.previous_status = Some(status);

            let listener = state.listener.clone()?;
            match state.context.as_ref()? {
                ListenerContext::Inline => Some(listener),
                context => {
                    context.dispatch(listener, status);
                    None
                }
            }
        });

        // Outside the lock so the listener may call back into the monitor.
        if let Some(listener) = inline {
            ListenerContext::Inline.dispatch(listener, status);
        }
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

impl std::fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("queue", &self.queue)
            .field("listening", &self.is_listening())
            .finish_non_exhaustive()
    }
}
