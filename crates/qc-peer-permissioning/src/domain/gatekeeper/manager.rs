//! Connection gatekeeper implementation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::types::{AdmissionResult, ConnectionStats};
use crate::domain::{
    Address, ConnectionDirection, ConnectionHandle, PeerConnection, PermissionRegistry,
    PermissionSnapshot, PublicKey, RejectReason, Timestamp,
};

/// Admission control plus the table of active connections.
///
/// Lock order is table first, registry second. The registry never touches
/// the table, so the two locks cannot deadlock.
#[derive(Debug)]
pub struct ConnectionGatekeeper {
    registry: Arc<PermissionRegistry>,
    /// All active connections, keyed by remote address
    connections: RwLock<HashMap<Address, PeerConnection>>,
    max_peers: usize,
    closing: AtomicBool,
}

impl ConnectionGatekeeper {
    /// Create a gatekeeper over a shared registry.
    pub fn new(registry: Arc<PermissionRegistry>, max_peers: usize) -> Self {
        Self {
            registry,
            connections: RwLock::new(HashMap::new()),
            max_peers,
            closing: AtomicBool::new(false),
        }
    }

    fn evaluate(
        &self,
        address: &Address,
        connections: &HashMap<Address, PeerConnection>,
    ) -> AdmissionResult {
        if self.is_closing() {
            return AdmissionResult::Rejected(RejectReason::ShuttingDown);
        }
        if *address == self.registry.local_address() {
            return AdmissionResult::Rejected(RejectReason::SelfConnection);
        }
        if !self.registry.is_permitted(address) {
            return AdmissionResult::Rejected(RejectReason::NotPermitted);
        }
        if connections.contains_key(address) {
            return AdmissionResult::Rejected(RejectReason::AlreadyConnected);
        }
        if connections.len() >= self.max_peers {
            return AdmissionResult::Rejected(RejectReason::TooManyPeers);
        }
        AdmissionResult::Accepted
    }

    /// Pre-handshake check for an outbound dial.
    ///
    /// Nothing is reserved; `admit` re-checks after the handshake.
    pub fn check_dial(&self, address: &Address) -> AdmissionResult {
        let result = self.evaluate(address, &self.connections.read());
        if let AdmissionResult::Rejected(reason) = result {
            debug!(address = %address, %reason, "dial refused");
        }
        result
    }

    /// Post-handshake, pre-activation admission for either direction.
    ///
    /// On acceptance the connection becomes Active in the table.
    pub fn admit(
        &self,
        direction: ConnectionDirection,
        public_key: PublicKey,
        address: Address,
        endpoint: SocketAddr,
        handle: ConnectionHandle,
        now: Timestamp,
    ) -> AdmissionResult {
        let mut connections = self.connections.write();
        let result = self.evaluate(&address, &connections);

        match result {
            AdmissionResult::Accepted => {
                connections.insert(
                    address,
                    PeerConnection {
                        address,
                        public_key,
                        endpoint,
                        handle,
                        direction,
                        established_at: now,
                    },
                );
                info!(address = %address, %endpoint, %direction, %handle, "peer connection active");
            }
            AdmissionResult::Rejected(reason) => {
                debug!(address = %address, %endpoint, %direction, %reason, "admission rejected");
            }
        }
        result
    }

    /// Transport reported `handle` closed. Returns the removed entry.
    pub fn on_closed(&self, handle: ConnectionHandle) -> Option<PeerConnection> {
        let mut connections = self.connections.write();
        let address = connections
            .values()
            .find(|c| c.handle == handle)
            .map(|c| c.address)?;
        connections.remove(&address)
    }

    /// Remove the connection to `address`, whatever its handle.
    pub fn disconnect(&self, address: &Address) -> Option<PeerConnection> {
        self.connections.write().remove(address)
    }

    /// Whether the table still holds this exact link.
    pub fn holds(&self, conn: &PeerConnection) -> bool {
        self.connections
            .read()
            .get(&conn.address)
            .is_some_and(|current| current.handle == conn.handle)
    }

    /// Remove `conn` only if the table still holds that same link.
    ///
    /// A peer that reconnected under a new handle is left alone.
    pub fn release(&self, conn: &PeerConnection) -> bool {
        let mut connections = self.connections.write();
        let same_link = connections
            .get(&conn.address)
            .is_some_and(|current| current.handle == conn.handle);
        if same_link {
            connections.remove(&conn.address);
        }
        same_link
    }

    /// Active connections the snapshot no longer permits.
    pub fn find_unpermitted(&self, snapshot: &PermissionSnapshot) -> Vec<PeerConnection> {
        self.connections
            .read()
            .values()
            .filter(|c| c.address != snapshot.local_address() && !snapshot.permits(&c.address))
            .cloned()
            .collect()
    }

    /// Copy of every active connection.
    pub fn active_connections(&self) -> Vec<PeerConnection> {
        self.connections.read().values().cloned().collect()
    }

    /// `(address, endpoint)` of every active peer, ordered by establishment
    /// time then address.
    pub fn list_active_peers(&self) -> Vec<(Address, SocketAddr)> {
        let mut peers: Vec<_> = self
            .connections
            .read()
            .values()
            .map(|c| (c.established_at, c.address, c.endpoint))
            .collect();
        peers.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        peers.into_iter().map(|(_, addr, ep)| (addr, ep)).collect()
    }

    /// Number of active connections.
    pub fn active_peer_count(&self) -> usize {
        self.connections.read().len()
    }

    /// Check if a peer is connected
    pub fn is_connected(&self, address: &Address) -> bool {
        self.connections.read().contains_key(address)
    }

    /// Get connection info for a peer
    pub fn get(&self, address: &Address) -> Option<PeerConnection> {
        self.connections.read().get(address).cloned()
    }

    /// Refuse all further admissions and drain the table.
    ///
    /// Returns the drained connections so the caller can close them.
    pub fn begin_shutdown(&self) -> Vec<PeerConnection> {
        self.closing.store(true, Ordering::SeqCst);
        self.connections.write().drain().map(|(_, c)| c).collect()
    }

    /// Whether shutdown has begun.
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Get statistics
    pub fn stats(&self) -> ConnectionStats {
        let connections = self.connections.read();
        let outbound_count = connections
            .values()
            .filter(|c| c.direction == ConnectionDirection::Outbound)
            .count();
        ConnectionStats {
            outbound_count,
            inbound_count: connections.len() - outbound_count,
            max_peers: self.max_peers,
        }
    }
}
