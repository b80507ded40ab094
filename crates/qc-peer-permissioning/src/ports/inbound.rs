//! # Driving Ports (Inbound API)
//!
//! These are the APIs this subsystem exposes: the hooks the discovery and
//! transport subsystems call at their enforcement points, and the
//! administrative API operators use to mutate the allow-list.

use std::net::SocketAddr;

use crate::domain::{
    Address, AdmissionResult, Candidate, ConnectionDirection, ConnectionHandle, PermissionError,
    PublicKey,
};

/// Administrative API for the allow-list.
///
/// # Latency
///
/// A grant or revoke is visible to every permission check that starts after
/// the call returns. Established connections of a revoked peer are closed by
/// the next enforcement tick; a granted peer is actively searched for by the
/// next rediscovery tick.
///
/// # Example
///
/// ```rust,ignore
/// use qc_peer_permissioning::ports::PermissionApi;
///
/// fn rotate<T: PermissionApi>(api: &T, old: &PublicKey, new: &PublicKey) {
///     api.grant(new);
///     api.revoke(old);
/// }
/// ```
pub trait PermissionApi {
    /// Add the key's derived address to the registry. Idempotent.
    fn grant(&self, public_key: &PublicKey) -> Address;

    /// Remove the key's derived address from the registry. Idempotent.
    fn revoke(&self, public_key: &PublicKey) -> Address;

    /// Add an address directly (e.g. from configuration). Idempotent.
    fn grant_address(&self, address: Address);

    /// Remove an address directly. Idempotent.
    fn revoke_address(&self, address: &Address);

    /// Current permission decision for `address`.
    fn is_permitted(&self, address: &Address) -> bool;

    /// Snapshot of active connections, ordered by establishment time then
    /// address.
    fn list_active_peers(&self) -> Vec<(Address, SocketAddr)>;

    /// Number of active connections.
    fn active_peer_count(&self) -> usize;
}

/// Hooks the discovery subsystem calls.
pub trait DiscoveryHooks {
    /// Called for every inbound discovery query, before any response.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` answer the query
    /// - `Ok(false)` drop it silently: no response, no error packet
    /// - `Err(MalformedKey)` the requester's key could not be resolved
    fn on_discovery_query(&self, requester_key: &[u8]) -> Result<bool, PermissionError>;

    /// Called on routing-table results before they are dialed or returned
    /// in a query response.
    fn filter_candidates(&self, candidates: Vec<Candidate>) -> Vec<Candidate>;
}

/// Hooks the connection transport calls.
pub trait ConnectionHooks {
    /// Before initiating an outbound handshake.
    fn check_dial(&self, target: &Candidate) -> AdmissionResult;

    /// After the identity handshake, before the connection is usable.
    ///
    /// A rejected connection has already been closed through the transport
    /// when this returns.
    ///
    /// # Errors
    ///
    /// Malformed key bytes or a failing close surface as `Err`, distinct from
    /// `Ok(Rejected(..))`.
    fn on_handshake_complete(
        &self,
        direction: ConnectionDirection,
        remote_key: &[u8],
        endpoint: SocketAddr,
        handle: ConnectionHandle,
    ) -> Result<AdmissionResult, PermissionError>;

    /// The transport closed `handle` (either side initiated).
    fn on_connection_closed(&self, handle: ConnectionHandle);
}
