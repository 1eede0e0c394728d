//! Network reachability.
//!
//! A [`ReachabilityProvider`] reports low-level [`ReachabilityFlags`]. The
//! [`ConnectivityMonitor`] turns them into a [`ReachabilityStatus`] and tells
//! its listener whenever that status changes.
//!
//! Two providers ship with the crate:
//!
//! - [`SystemReachability`] watches the host's network interfaces.
//! - [`ManualReachability`] is driven by the embedder.

mod flags;
mod monitor;
mod provider;
mod queue;
mod status;
mod system;

pub use flags::ReachabilityFlags;
pub use monitor::{ConnectivityMonitor, Listener, ListenerContext, REACHABILITY_QUEUE_LABEL};
pub use provider::{FlagsCallback, ManualReachability, ReachabilityProvider};
pub use queue::SerialQueue;
pub use status::{ConnectionType, ReachabilityStatus};
pub use system::{InterfaceSnapshot, SystemReachability, flags_from_interfaces};
