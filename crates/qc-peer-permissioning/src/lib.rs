//! # Peer Permissioning Subsystem
//!
//! Dynamic allow-list access control for a permissioned peer-to-peer
//! network. Peers are identified by the 20-byte address derived from their
//! secp256k1 public key, and only addresses in the registry may take part
//! in discovery or hold a connection.
//!
//! ## Enforcement Points
//!
//! - **Discovery:** queries from unpermitted keys are dropped and
//!   unpermitted candidates never reach the dialer
//! - **Connection:** the gatekeeper re-checks every dial and every completed
//!   handshake, in both directions
//! - **Reconciliation:** a periodic tick disconnects peers whose permission
//!   was revoked, and a second tick re-triggers discovery so new grants are
//!   picked up
//!
//! ## Architecture
//!
//! - **Domain Layer:** identity resolution, registry, filter, gatekeeper
//! - **Ports Layer:** hooks the host calls, and the transport / discovery
//!   interfaces the host provides
//! - **Service Layer:** wires domain to ports
//! - **Adapters Layer:** config sources, system clock, reconciliation timers
//!
//! ## Example
//!
//! ```rust
//! use qc_peer_permissioning::{Address, PermissionRegistry};
//!
//! let local = Address::new([0xaa; 20]);
//! let peer: Address = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".parse().unwrap();
//!
//! let registry = PermissionRegistry::restricted(local, []);
//! assert!(registry.is_permitted(&local));
//! assert!(!registry.is_permitted(&peer));
//!
//! registry.add(peer);
//! assert!(registry.is_permitted(&peer));
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;
pub mod service;

/// Config sources, system clock and reconciliation timers.
pub mod adapters;

/// Test utilities (FixedTimeSource, RecordingTransport, etc.)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use domain::{
    address_of, keccak256, resolve, Address, AdmissionResult, Candidate, ConnectionDirection,
    ConnectionGatekeeper, ConnectionHandle, ConnectionStats, DisconnectReason, DiscoveryFilter,
    NetworkError, PeerConnection, PermissionConfig, PermissionError, PermissionRegistry,
    PermissionSnapshot, PublicKey, RejectReason, Timestamp,
};

pub use ports::{
    ConfigProvider, ConnectionHooks, DiscoveryHooks, LookupTrigger, PeerTransport,
    PermissionApi, TimeSource,
};

pub use service::{EnforcementReport, PermissionService};

pub use adapters::{ConfigError, StaticConfigProvider, SystemTimeSource};

#[cfg(feature = "network")]
pub use adapters::TomlConfigProvider;

#[cfg(feature = "reconcile")]
pub use adapters::{ReconcilerHandle, ReconciliationLoop};
