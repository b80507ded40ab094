//! # Discovery Filter
//!
//! Two enforcement points against the external discovery subsystem:
//!
//! - **Inbound queries**: the requester is checked before any response is
//!   built. A denied query is dropped silently, so an unpermitted requester
//!   sees us as unreachable rather than as refusing.
//! - **Outbound candidates**: routing-table results are filtered before they
//!   reach the dialer or a query response.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{address_of, Address, Candidate, PermissionRegistry};

/// Registry-backed filter for discovery traffic.
#[derive(Debug, Clone)]
pub struct DiscoveryFilter {
    registry: Arc<PermissionRegistry>,
}

impl DiscoveryFilter {
    /// Create a filter over a shared registry.
    pub fn new(registry: Arc<PermissionRegistry>) -> Self {
        Self { registry }
    }

    /// Should a discovery query from `requester` be answered?
    pub fn allow_query(&self, requester: &Address) -> bool {
        let allowed = self.registry.is_permitted(requester);
        if !allowed {
            debug!(requester = %requester, "dropping discovery query from unpermitted node");
        }
        allowed
    }

    /// Should `candidate` be surfaced?
    ///
    /// The address is derived from the record's key; the record's own
    /// `address` field must agree with it. Our own record is never surfaced.
    pub fn permits_candidate(&self, candidate: &Candidate) -> bool {
        let derived = address_of(&candidate.public_key);
        if derived != candidate.address {
            debug!(
                claimed = %candidate.address,
                derived = %derived,
                "dropping candidate whose address does not match its key"
            );
            return false;
        }
        derived != self.registry.local_address() && self.registry.is_permitted(&derived)
    }

    /// Keep only the candidates that may be surfaced, preserving order.
    pub fn filter_candidates(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let before = candidates.len();
        let kept: Vec<_> = candidates
            .into_iter()
            .filter(|c| self.permits_candidate(c))
            .collect();

        if kept.len() < before {
            debug!(
                dropped = before - kept.len(),
                kept = kept.len(),
                "filtered unpermitted discovery candidates"
            );
        }
        kept
    }
}
