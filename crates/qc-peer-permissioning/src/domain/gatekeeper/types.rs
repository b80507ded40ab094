//! Gatekeeper types.

use crate::domain::RejectReason;

/// Outcome of an admission check (dial or post-handshake).
///
/// `Accepted` from `check_dial` means the handshake may begin; the
/// connection is only Active after `admit` accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionResult {
    /// Attempt may proceed / connection is now active
    Accepted,
    /// Attempt refused; the transport must tear it down silently
    Rejected(RejectReason),
}

impl AdmissionResult {
    /// Convenience for call sites that only need the boolean.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Connection statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Current number of outbound connections.
    pub outbound_count: usize,
    /// Current number of inbound connections.
    pub inbound_count: usize,
    /// Maximum active connections allowed.
    pub max_peers: usize,
}

impl ConnectionStats {
    /// Total active connections.
    pub fn total(&self) -> usize {
        self.outbound_count + self.inbound_count
    }
}
