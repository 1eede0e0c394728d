//! Reachability derived from the host's network interfaces.

use std::sync::Arc;

use parking_lot::Mutex;

use super::flags::ReachabilityFlags;
use super::provider::{CallbackSlot, FlagsCallback, ReachabilityProvider};
use super::queue::SerialQueue;
use crate::protected::ProtectedState;

/// Name prefixes used by cellular data interfaces across platforms.
const CELLULAR_PREFIXES: &[&str] = &["wwan", "rmnet", "pdp_ip", "ccmni", "wwp"];

/// The parts of a network interface that decide reachability.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterfaceSnapshot {
    /// Interface name (e.g. "eth0", "en0", "rmnet_data0").
    pub name: String,
    /// Whether the interface is up.
    pub is_up: bool,
    /// Whether the interface is a loopback interface.
    pub is_loopback: bool,
    /// Number of IPv4 and IPv6 addresses assigned.
    pub address_count: usize,
}

impl InterfaceSnapshot {
    /// Snapshot every interface on the system.
    pub fn list() -> Vec<InterfaceSnapshot> {
        netdev::get_interfaces().iter().map(Self::from_netdev).collect()
    }

    /// Name of the interface carrying the default route, if any.
    pub fn default_name() -> Option<String> {
        netdev::get_default_interface().ok().map(|iface| iface.name)
    }

    fn from_netdev(iface: &netdev::Interface) -> Self {
        Self {
            name: iface.name.clone(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            address_count: iface.ipv4.len() + iface.ipv6.len(),
        }
    }

    /// Up, not loopback, with at least one address.
    pub fn is_usable(&self) -> bool {
        self.is_up && !self.is_loopback && self.address_count > 0
    }

    /// Whether the name looks like a cellular data interface.
    pub fn is_cellular(&self) -> bool {
        let name = self.name.to_ascii_lowercase();
        CELLULAR_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
    }
}

/// Derive flags from an interface list.
///
/// The network is reachable when any interface is usable. It counts as
/// cellular when the default-route interface is cellular, or, without a
/// known default route, when every usable interface is.
pub fn flags_from_interfaces(interfaces: &[InterfaceSnapshot], default_name: Option<&str>) -> ReachabilityFlags {
    let usable: Vec<&InterfaceSnapshot> = interfaces.iter().filter(|iface| iface.is_usable()).collect();
    if usable.is_empty() {
        return ReachabilityFlags::empty();
    }

    let mut flags = ReachabilityFlags::REACHABLE;
    let default_iface = default_name.and_then(|name| usable.iter().find(|iface| iface.name == name));
    let cellular = match default_iface {
        Some(iface) => iface.is_cellular(),
        None => usable.iter().all(|iface| iface.is_cellular()),
    };
    if cellular {
        flags.insert(ReachabilityFlags::IS_WWAN);
    }
    flags
}

fn current_flags() -> ReachabilityFlags {
    let default_name = InterfaceSnapshot::default_name();
    flags_from_interfaces(&InterfaceSnapshot::list(), default_name.as_deref())
}

/// Watches the host's interfaces and reports flags derived from them.
///
/// The watcher runs only while a callback is attached. Every interface
/// change re-derives the flags; the monitor filters out repeats.
pub struct SystemReachability {
    slot: Arc<ProtectedState<CallbackSlot>>,
    watcher: Mutex<Option<netwatcher::WatchHandle>>,
}

impl SystemReachability {
    /// Create a provider. No watcher runs until a callback is attached.
    pub fn new() -> Self {
        Self {
            slot: Arc::new(ProtectedState::default()),
            watcher: Mutex::new(None),
        }
    }

    /// Whether the interface watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.lock().is_some()
    }

    fn start_watcher(&self) -> bool {
        let mut watcher = self.watcher.lock();
        if watcher.is_some() {
            return true;
        }

        let slot = Arc::clone(&self.slot);
        let handle = netwatcher::watch_interfaces(move |_update| {
            let flags = current_flags();
            tracing::trace!(
                target: "remote_request_net::reachability",
                flags = %flags.readable_description(),
                "Network interfaces changed"
            );
            slot.get().deliver(flags);
        });

        match handle {
            Ok(handle) => {
                *watcher = Some(handle);
                true
            }
            Err(e) => {
                tracing::warn!(target: "remote_request_net::reachability", "Failed to watch network interfaces: {}", e);
                false
            }
        }
    }
}

impl Default for SystemReachability {
    fn default() -> Self {
        Self::new()
    }
}

impl ReachabilityProvider for SystemReachability {
    fn flags(&self) -> Option<ReachabilityFlags> {
        Some(current_flags())
    }

    fn set_callback(&self, callback: Option<FlagsCallback>) -> bool {
        let attach = callback.is_some();
        self.slot.write(|slot| slot.set_callback(callback));

        if attach {
            self.start_watcher()
        } else {
            // Dropping the handle stops the watcher.
            self.watcher.lock().take();
            true
        }
    }

    fn set_dispatch_queue(&self, queue: Option<SerialQueue>) -> bool {
        self.slot.write(|slot| slot.set_queue(queue));
        true
    }
}

impl std::fmt::Debug for SystemReachability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemReachability")
            .field("watching", &self.is_watching())
            .finish()
    }
}
