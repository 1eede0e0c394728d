//! Derived reachability status.

use super::flags::ReachabilityFlags;

/// How a reachable network is connected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Ethernet or Wi-Fi.
    EthernetOrWifi,
    /// Cellular.
    Cellular,
}

/// The reachability of the network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReachabilityStatus {
    /// No flags are available.
    #[default]
    Unknown,
    /// The network is not reachable.
    NotReachable,
    /// The network is reachable over the given connection.
    Reachable(ConnectionType),
}

impl ReachabilityStatus {
    /// Derive the status from flags.
    ///
    /// Cellular wins over the generic reachable case.
    pub fn from_flags(flags: ReachabilityFlags) -> Self {
        if !flags.is_actually_reachable() {
            Self::NotReachable
        } else if flags.is_cellular() {
            Self::Reachable(ConnectionType::Cellular)
        } else {
            Self::Reachable(ConnectionType::EthernetOrWifi)
        }
    }

    /// Derive the status from optional flags; `None` is [`Unknown`](Self::Unknown).
    pub fn from_optional_flags(flags: Option<ReachabilityFlags>) -> Self {
        flags.map_or(Self::Unknown, Self::from_flags)
    }

    /// Whether the network is reachable by any connection.
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable(_))
    }
}

impl From<ReachabilityFlags> for ReachabilityStatus {
    fn from(flags: ReachabilityFlags) -> Self {
        Self::from_flags(flags)
    }
}

impl std::fmt::Display for ReachabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::NotReachable => write!(f, "Not reachable"),
            Self::Reachable(ConnectionType::Cellular) => write!(f, "Reachable (cellular)"),
            Self::Reachable(ConnectionType::EthernetOrWifi) => write!(f, "Reachable (ethernet or Wi-Fi)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cellular() {
        let flags = ReachabilityFlags::REACHABLE | ReachabilityFlags::IS_WWAN;
        assert_eq!(
            ReachabilityStatus::from_flags(flags),
            ReachabilityStatus::Reachable(ConnectionType::Cellular)
        );
    }

    #[test]
    fn test_not_reachable_ignores_wwan() {
        assert_eq!(
            ReachabilityStatus::from_flags(ReachabilityFlags::IS_WWAN),
            ReachabilityStatus::NotReachable
        );
    }

    #[test]
    fn test_unknown_without_flags() {
        assert_eq!(ReachabilityStatus::from_optional_flags(None), ReachabilityStatus::Unknown);
        assert!(!ReachabilityStatus::Unknown.is_reachable());
    }
}
