//! Permission set and snapshot types.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::Address;

/// Allow-list contents plus the restriction flag.
///
/// `restricted == false` means no restriction was ever configured and every
/// address is permitted, regardless of `members`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    pub(crate) restricted: bool,
    pub(crate) members: HashSet<Address>,
}

impl PermissionSet {
    /// Unrestricted set.
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Restricted set with the given members.
    pub fn restricted(members: impl IntoIterator<Item = Address>) -> Self {
        Self {
            restricted: true,
            members: members.into_iter().collect(),
        }
    }

    /// Membership under the registry's semantics, ignoring the local address.
    pub(crate) fn admits(&self, address: &Address) -> bool {
        !self.restricted || self.members.contains(address)
    }
}

/// Immutable view of the registry at one instant.
///
/// Holding a snapshot holds no lock; it shares the set the registry had when
/// the snapshot was taken and is unaffected by later mutations.
#[derive(Debug, Clone)]
pub struct PermissionSnapshot {
    pub(crate) set: Arc<PermissionSet>,
    pub(crate) local: Address,
}

impl PermissionSnapshot {
    /// Same decision `PermissionRegistry::is_permitted` made at snapshot time.
    pub fn permits(&self, address: &Address) -> bool {
        *address == self.local || self.set.admits(address)
    }

    /// Whether a restriction was configured.
    pub fn is_restricted(&self) -> bool {
        self.set.restricted
    }

    /// Explicit members (excludes the implicit local address).
    pub fn members(&self) -> &HashSet<Address> {
        &self.set.members
    }

    /// Our own address.
    pub fn local_address(&self) -> Address {
        self.local
    }
}
