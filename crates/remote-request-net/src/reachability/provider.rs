//! Sources of reachability flags.

use std::sync::Arc;

use super::flags::ReachabilityFlags;
use super::queue::SerialQueue;
use crate::protected::ProtectedState;

/// Callback invoked with fresh flags whenever they change.
pub type FlagsCallback = Arc<dyn Fn(ReachabilityFlags) + Send + Sync>;

/// A platform primitive that reports reachability flags.
///
/// Callbacks are delivered on the attached dispatch queue, or on the
/// provider's own thread when none is attached.
pub trait ReachabilityProvider: Send + Sync {
    /// Current flags, or `None` if they cannot be determined.
    fn flags(&self) -> Option<ReachabilityFlags>;

    /// Attach or detach (`None`) the change callback.
    ///
    /// Returns `false` if attaching failed.
    fn set_callback(&self, callback: Option<FlagsCallback>) -> bool;

    /// Attach or detach (`None`) the queue callbacks are delivered on.
    ///
    /// Returns `false` if attaching failed.
    fn set_dispatch_queue(&self, queue: Option<SerialQueue>) -> bool;
}

/// Callback and queue shared by the providers in this module.
#[derive(Clone, Default)]
pub(crate) struct CallbackSlot {
    callback: Option<FlagsCallback>,
    queue: Option<SerialQueue>,
}

impl CallbackSlot {
    pub(crate) fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    pub(crate) fn set_callback(&mut self, callback: Option<FlagsCallback>) {
        self.callback = callback;
    }

    pub(crate) fn set_queue(&mut self, queue: Option<SerialQueue>) {
        self.queue = queue;
    }

    /// Hand `flags` to the callback on the attached queue, or inline.
    ///
    /// Call without holding the lock that guards the slot.
    pub(crate) fn deliver(self, flags: ReachabilityFlags) {
        let Some(callback) = self.callback else {
            return;
        };
        match self.queue {
            Some(queue) => {
                if !queue.dispatch(move || callback(flags)) {
                    tracing::warn!(target: "remote_request_net::reachability", "Dispatch queue is gone; dropping reachability event");
                }
            }
            None => callback(flags),
        }
    }
}

/// A provider driven by hand.
///
/// Useful for embedders with their own platform integration and for tests.
/// Each [`push`](Self::push) delivers the flags to the attached callback,
/// even when they equal the previous ones.
#[derive(Default)]
pub struct ManualReachability {
    state: ProtectedState<ManualState>,
}

#[derive(Default)]
struct ManualState {
    flags: Option<ReachabilityFlags>,
    slot: CallbackSlot,
    refuse_callback: bool,
    refuse_queue: bool,
}

impl ManualReachability {
    /// A provider with no flags yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose current flags are `flags`.
    pub fn with_flags(flags: ReachabilityFlags) -> Self {
        let provider = Self::default();
        provider.state.write(|state| state.flags = Some(flags));
        provider
    }

    /// Make callback attachment fail.
    pub fn refuse_callback(self) -> Self {
        self.state.write(|state| state.refuse_callback = true);
        self
    }

    /// Make queue attachment fail.
    pub fn refuse_queue(self) -> Self {
        self.state.write(|state| state.refuse_queue = true);
        self
    }

    /// Store `flags` as current and report them to the callback.
    pub fn push(&self, flags: ReachabilityFlags) {
        let slot = self.state.write(|state| {
            state.flags = Some(flags);
            state.slot.clone()
        });
        slot.deliver(flags);
    }

    /// Forget the current flags without notifying.
    pub fn clear(&self) {
        self.state.write(|state| state.flags = None);
    }

    /// Whether a callback is attached.
    pub fn has_callback(&self) -> bool {
        self.state.read(|state| state.slot.has_callback())
    }
}

impl ReachabilityProvider for ManualReachability {
    fn flags(&self) -> Option<ReachabilityFlags> {
        self.state.read(|state| state.flags)
    }

    fn set_callback(&self, callback: Option<FlagsCallback>) -> bool {
        self.state.write(|state| {
            if callback.is_some() && state.refuse_callback {
                return false;
            }
            state.slot.set_callback(callback);
            true
        })
    }

    fn set_dispatch_queue(&self, queue: Option<SerialQueue>) -> bool {
        self.state.write(|state| {
            if queue.is_some() && state.refuse_queue {
                return false;
            }
            state.slot.set_queue(queue);
            true
        })
    }
}

impl std::fmt::Debug for ManualReachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualReachability")
            .field("flags", &self.flags())
            .field("has_callback", &self.has_callback())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn test_push_without_queue_is_inline() {
        let provider = ManualReachability::new();
        let seen = Arc::new(AtomicU32::new(0));
        let sink = seen.clone();
        assert!(provider.set_callback(Some(Arc::new(move |flags: ReachabilityFlags| {
            sink.store(flags.bits(), Ordering::SeqCst);
        }))));

        provider.push(ReachabilityFlags::REACHABLE);
        assert_eq!(seen.load(Ordering::SeqCst), ReachabilityFlags::REACHABLE.bits());
        assert_eq!(provider.flags(), Some(ReachabilityFlags::REACHABLE));
    }

    #[test]
    fn test_refused_attachment() {
        let provider = ManualReachability::new().refuse_callback();
        assert!(!provider.set_callback(Some(Arc::new(|_| {}))));
        assert!(provider.set_callback(None));
        assert!(!provider.has_callback());
    }
}
