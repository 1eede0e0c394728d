//! Low-level reachability flags.

use std::ops::{BitOr, BitOrAssign};

/// A set of reachability bits as reported by a [`ReachabilityProvider`].
///
/// [`ReachabilityProvider`]: super::ReachabilityProvider
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReachabilityFlags(u32);

impl ReachabilityFlags {
    /// The destination is reachable through a transient connection.
    pub const TRANSIENT_CONNECTION: Self = Self(1 << 0);
    /// The destination is reachable with the current configuration.
    pub const REACHABLE: Self = Self(1 << 1);
    /// A connection must be established first.
    pub const CONNECTION_REQUIRED: Self = Self(1 << 2);
    /// A connection is established automatically on traffic.
    pub const CONNECTION_ON_TRAFFIC: Self = Self(1 << 3);
    /// User intervention is needed to establish the connection.
    pub const INTERVENTION_REQUIRED: Self = Self(1 << 4);
    /// A connection is established on demand.
    pub const CONNECTION_ON_DEMAND: Self = Self(1 << 5);
    /// The destination is a local address.
    pub const IS_LOCAL_ADDRESS: Self = Self(1 << 16);
    /// Traffic goes directly to the destination, not through a gateway.
    pub const IS_DIRECT: Self = Self(1 << 17);
    /// The path runs over a cellular (WWAN) interface.
    pub const IS_WWAN: Self = Self(1 << 18);
    /// Same bit as [`CONNECTION_ON_TRAFFIC`](Self::CONNECTION_ON_TRAFFIC).
    pub const CONNECTION_AUTOMATIC: Self = Self::CONNECTION_ON_TRAFFIC;

    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set the bits in `other`.
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the bits in `other`.
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// `REACHABLE` is set.
    pub fn is_reachable(self) -> bool {
        self.contains(Self::REACHABLE)
    }

    /// `CONNECTION_REQUIRED` is set.
    pub fn is_connection_required(self) -> bool {
        self.contains(Self::CONNECTION_REQUIRED)
    }

    /// A connection would be brought up on demand or on traffic.
    pub fn can_connect_automatically(self) -> bool {
        self.contains(Self::CONNECTION_ON_DEMAND) || self.contains(Self::CONNECTION_ON_TRAFFIC)
    }

    /// A connection would be brought up without asking the user.
    pub fn can_connect_without_user_interaction(self) -> bool {
        self.can_connect_automatically() && !self.contains(Self::INTERVENTION_REQUIRED)
    }

    /// Reachable now, or reachable once a connection comes up on its own.
    pub fn is_actually_reachable(self) -> bool {
        self.is_reachable() && (!self.is_connection_required() || self.can_connect_without_user_interaction())
    }

    /// `IS_WWAN` is set.
    pub fn is_cellular(self) -> bool {
        self.contains(Self::IS_WWAN)
    }

    /// Compact rendering for logs, e.g. `"WR ctiCDlda"` with `-` for each
    /// clear bit.
    pub fn readable_description(self) -> String {
        let bit = |set: bool, c: char| if set { c } else { '-' };
        let mut s = String::with_capacity(11);
        s.push(bit(self.is_cellular(), 'W'));
        s.push(bit(self.is_reachable(), 'R'));
        s.push(' ');
        s.push(bit(self.is_connection_required(), 'c'));
        s.push(bit(self.contains(Self::TRANSIENT_CONNECTION), 't'));
        s.push(bit(self.contains(Self::INTERVENTION_REQUIRED), 'i'));
        s.push(bit(self.contains(Self::CONNECTION_ON_TRAFFIC), 'C'));
        s.push(bit(self.contains(Self::CONNECTION_ON_DEMAND), 'D'));
        s.push(bit(self.contains(Self::IS_LOCAL_ADDRESS), 'l'));
        s.push(bit(self.contains(Self::IS_DIRECT), 'd'));
        s.push(bit(self.contains(Self::CONNECTION_AUTOMATIC), 'a'));
        s
    }
}

impl BitOr for ReachabilityFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ReachabilityFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::fmt::Debug for ReachabilityFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReachabilityFlags({})", self.readable_description())
    }
}
