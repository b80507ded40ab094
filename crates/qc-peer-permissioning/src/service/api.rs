use std::net::SocketAddr;

use tracing::{debug, info, warn};

use crate::domain::{
    address_of, resolve, Address, AdmissionResult, Candidate, ConnectionDirection,
    ConnectionHandle, DisconnectReason, PermissionError, PublicKey,
};
use crate::ports::{ConnectionHooks, DiscoveryHooks, NetworkError, PermissionApi};
use crate::service::PermissionService;

impl PermissionService {
    /// Close a link we refused. A link that is already gone counts as closed.
    fn close_refused(&self, handle: ConnectionHandle) -> Result<(), NetworkError> {
        match self.transport.close(handle) {
            Ok(()) | Err(NetworkError::AlreadyClosed) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl PermissionApi for PermissionService {
    fn grant(&self, public_key: &PublicKey) -> Address {
        let address = address_of(public_key);
        self.grant_address(address);
        address
    }

    fn revoke(&self, public_key: &PublicKey) -> Address {
        let address = address_of(public_key);
        self.revoke_address(&address);
        address
    }

    fn grant_address(&self, address: Address) {
        if self.registry.add(address) {
            info!(address = %address, "permission granted");
        }
    }

    fn revoke_address(&self, address: &Address) {
        if self.registry.remove(address) {
            info!(
                address = %address,
                connected = self.gatekeeper.is_connected(address),
                "permission revoked"
            );
        }
    }

    fn is_permitted(&self, address: &Address) -> bool {
        self.registry.is_permitted(address)
    }

    fn list_active_peers(&self) -> Vec<(Address, SocketAddr)> {
        self.gatekeeper.list_active_peers()
    }

    fn active_peer_count(&self) -> usize {
        self.gatekeeper.active_peer_count()
    }
}

impl DiscoveryHooks for PermissionService {
    fn on_discovery_query(&self, requester_key: &[u8]) -> Result<bool, PermissionError> {
        let (_, requester) = resolve(requester_key)?;
        Ok(self.filter.allow_query(&requester))
    }

    fn filter_candidates(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        self.filter.filter_candidates(candidates)
    }
}

impl ConnectionHooks for PermissionService {
    fn check_dial(&self, target: &Candidate) -> AdmissionResult {
        // Derive again rather than trusting the record's address field.
        let address = address_of(&target.public_key);
        self.gatekeeper.check_dial(&address)
    }

    fn on_handshake_complete(
        &self,
        direction: ConnectionDirection,
        remote_key: &[u8],
        endpoint: SocketAddr,
        handle: ConnectionHandle,
    ) -> Result<AdmissionResult, PermissionError> {
        let (public_key, address) = match resolve(remote_key) {
            Ok(resolved) => resolved,
            Err(e) => {
                if let Err(close_err) = self.close_refused(handle) {
                    warn!(%handle, %endpoint, error = %close_err, "failed to close link with malformed key");
                }
                return Err(e);
            }
        };

        let result = self.gatekeeper.admit(
            direction,
            public_key,
            address,
            endpoint,
            handle,
            self.now(),
        );

        if let AdmissionResult::Rejected(reason) = result {
            debug!(address = %address, %handle, %reason, "tearing down refused connection");
            self.close_refused(handle)?;
        }
        Ok(result)
    }

    fn on_connection_closed(&self, handle: ConnectionHandle) {
        if let Some(conn) = self.gatekeeper.on_closed(handle) {
            info!(
                address = %conn.address,
                %handle,
                reason = %DisconnectReason::TransportClosed,
                "peer disconnected"
            );
        }
    }
}
