//! Value Objects for Peer Permissioning

use std::time::Duration;

use super::entities::Address;

/// Configuration for the permissioning layer.
///
/// # Restriction Semantics
///
/// - `permitted: None` runs the node unrestricted: every address is permitted.
/// - `permitted: Some(list)` restricts the node to `list` plus its own
///   address. `Some(vec![])` is valid and permits only the node itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionConfig {
    /// Initial allow-list. `None` means unrestricted.
    pub permitted: Option<Vec<Address>>,
    /// Maximum number of active connections (inbound + outbound)
    pub max_peers: usize,
    /// Period of the enforcement tick (revocation latency bound)
    pub enforcement_interval: Duration,
    /// Period of the rediscovery tick (grant latency bound)
    pub rediscovery_interval: Duration,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            permitted: None,
            max_peers: 50,
            enforcement_interval: Duration::from_secs(2),
            rediscovery_interval: Duration::from_secs(15),
        }
    }
}

impl PermissionConfig {
    /// Create a config suitable for testing (small limits, fast ticks)
    pub fn for_testing() -> Self {
        Self {
            permitted: None,
            max_peers: 5,
            enforcement_interval: Duration::from_secs(1),
            rediscovery_interval: Duration::from_secs(5),
        }
    }

    /// Restrict the node to the given addresses.
    #[must_use]
    pub fn with_permitted(mut self, addresses: impl IntoIterator<Item = Address>) -> Self {
        self.permitted = Some(addresses.into_iter().collect());
        self
    }

    /// Whether the config requests any restriction.
    pub fn is_restricted(&self) -> bool {
        self.permitted.is_some()
    }
}
