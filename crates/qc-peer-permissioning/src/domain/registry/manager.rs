//! Permission registry implementation.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::set::{PermissionSet, PermissionSnapshot};
use crate::domain::{Address, PermissionConfig};

/// Runtime-mutable allow-list shared by the discovery filter, the
/// gatekeeper and the reconciliation loop.
///
/// # Concurrency
///
/// Reads take a short read lock and return immediately. Mutations replace
/// the shared set copy-on-write, so snapshots taken earlier keep their view
/// and never block writers. A mutation is visible to every read that starts
/// after it returns.
#[derive(Debug)]
pub struct PermissionRegistry {
    local: Address,
    set: RwLock<Arc<PermissionSet>>,
}

impl PermissionRegistry {
    /// Registry that permits every address.
    pub fn unrestricted(local: Address) -> Self {
        Self::with_set(local, PermissionSet::unrestricted())
    }

    /// Registry restricted to `members` (plus `local`).
    pub fn restricted(local: Address, members: impl IntoIterator<Item = Address>) -> Self {
        Self::with_set(local, PermissionSet::restricted(members))
    }

    /// Build from startup configuration.
    pub fn from_config(local: Address, config: &PermissionConfig) -> Self {
        match &config.permitted {
            Some(list) => Self::restricted(local, list.iter().copied()),
            None => Self::unrestricted(local),
        }
    }

    fn with_set(local: Address, set: PermissionSet) -> Self {
        Self {
            local,
            set: RwLock::new(Arc::new(set)),
        }
    }

    /// Is `address` currently permitted?
    ///
    /// Always true when unrestricted. Otherwise true iff `address` is a
    /// member or is our own address.
    pub fn is_permitted(&self, address: &Address) -> bool {
        *address == self.local || self.set.read().admits(address)
    }

    /// Insert `address`. Returns `true` if the set changed.
    pub fn add(&self, address: Address) -> bool {
        let mut guard = self.set.write();
        if guard.members.contains(&address) {
            return false;
        }
        Arc::make_mut(&mut *guard).members.insert(address);
        debug!(address = %address, "permission registry: added");
        true
    }

    /// Remove `address`. Returns `true` if the set changed.
    pub fn remove(&self, address: &Address) -> bool {
        let mut guard = self.set.write();
        if !guard.members.contains(address) {
            return false;
        }
        Arc::make_mut(&mut *guard).members.remove(address);
        debug!(address = %address, "permission registry: removed");
        true
    }

    /// Switch to restricted mode, keeping current members.
    ///
    /// Returns `true` if the registry was unrestricted before the call.
    pub fn restrict(&self) -> bool {
        let mut guard = self.set.write();
        if guard.restricted {
            return false;
        }
        Arc::make_mut(&mut *guard).restricted = true;
        debug!(members = guard.members.len(), "permission registry: restriction enabled");
        true
    }

    /// Immutable copy of the current state.
    pub fn snapshot(&self) -> PermissionSnapshot {
        PermissionSnapshot {
            set: Arc::clone(&*self.set.read()),
            local: self.local,
        }
    }

    /// Whether a restriction is configured.
    pub fn is_restricted(&self) -> bool {
        self.set.read().restricted
    }

    /// Number of explicit members.
    pub fn len(&self) -> usize {
        self.set.read().members.len()
    }

    /// True if there are no explicit members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Our own address (always permitted).
    pub fn local_address(&self) -> Address {
        self.local
    }
}
