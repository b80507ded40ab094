use tracing::{debug, info, warn};

use crate::domain::{Address, DisconnectReason, PeerConnection};
use crate::ports::NetworkError;
use crate::service::PermissionService;

/// Outcome of one enforcement tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnforcementReport {
    /// Active connections examined
    pub checked: usize,
    /// Peers removed because they are no longer permitted
    pub disconnected: Vec<Address>,
    /// Closes that found the link already dead (no-op)
    pub stale: usize,
    /// Closes that failed for another reason (entry kept for the next tick)
    pub failed: usize,
}

impl PermissionService {
    /// Enforcement tick: disconnect every active peer the registry no
    /// longer permits.
    ///
    /// Works on a registry snapshot and a copied connection list, so no lock
    /// is held while the transport closes links. An entry leaves the table
    /// only once its link is known to be gone; a failed close keeps it for
    /// the next tick to retry. Call from a timer task; see
    /// `adapters::ReconciliationLoop`.
    pub fn enforce_permissions(&self) -> EnforcementReport {
        let snapshot = self.registry.snapshot();
        let mut report = EnforcementReport {
            checked: self.gatekeeper.active_peer_count(),
            ..Default::default()
        };

        for conn in self.gatekeeper.find_unpermitted(&snapshot) {
            // Closed by the transport or replaced since the scan.
            if !self.gatekeeper.holds(&conn) {
                continue;
            }
            if !self.close_connection(&conn, DisconnectReason::PermissionRevoked, &mut report) {
                continue;
            }
            if self.gatekeeper.release(&conn) {
                report.disconnected.push(conn.address);
            }
        }

        if !report.disconnected.is_empty() {
            info!(
                disconnected = report.disconnected.len(),
                remaining = self.gatekeeper.active_peer_count(),
                "enforcement tick removed unpermitted peers"
            );
        }
        report
    }

    /// Rediscovery tick: ask the discovery subsystem for a fresh lookup so
    /// newly granted peers are found promptly. No permission logic.
    pub fn request_rediscovery(&self) -> Result<(), NetworkError> {
        self.lookup.trigger_lookup().inspect_err(|e| {
            warn!(error = %e, "rediscovery lookup could not be started");
        })
    }

    /// Refuse further admissions and close every active connection.
    ///
    /// Returns the number of connections that were active.
    pub fn shutdown(&self) -> usize {
        let drained = self.gatekeeper.begin_shutdown();
        let mut report = EnforcementReport {
            checked: drained.len(),
            ..Default::default()
        };
        for conn in &drained {
            self.close_connection(conn, DisconnectReason::Shutdown, &mut report);
        }
        info!(closed = drained.len(), "permissioning shut down");
        drained.len()
    }

    /// Returns `true` once the link is gone, whether we closed it or it was
    /// already dead.
    fn close_connection(
        &self,
        conn: &PeerConnection,
        reason: DisconnectReason,
        report: &mut EnforcementReport,
    ) -> bool {
        match self.transport.close(conn.handle) {
            Ok(()) => {
                info!(address = %conn.address, handle = %conn.handle, %reason, "peer disconnected");
                true
            }
            Err(NetworkError::AlreadyClosed) => {
                report.stale += 1;
                debug!(address = %conn.address, handle = %conn.handle, "connection already closed");
                true
            }
            Err(e) => {
                report.failed += 1;
                warn!(address = %conn.address, handle = %conn.handle, error = %e, "close failed");
                false
            }
        }
    }
}
