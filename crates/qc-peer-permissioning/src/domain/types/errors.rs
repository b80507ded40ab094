//! Domain Errors for Peer Permissioning
//!
//! Permission decisions are never errors. A denied peer gets a boolean or an
//! [`AdmissionResult::Rejected`](crate::domain::AdmissionResult); the types in
//! this module cover the cases where the check itself could not be performed.

use std::fmt;

use thiserror::Error;

/// Failures of the primitives underneath a permission check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// Remote key bytes are not a valid secp256k1 point.
    #[error("malformed public key ({len} bytes)")]
    MalformedKey { len: usize },

    /// Address string is not 20 hex-encoded bytes.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Transport or discovery primitive failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

/// Errors reported by the host transport and discovery ports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// The connection was already gone when we tried to close it
    AlreadyClosed,
    /// Operation timed out
    Timeout,
    /// Discovery subsystem is not running
    DiscoveryUnavailable,
    /// Any other I/O failure
    Io(String),
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkError::AlreadyClosed => write!(f, "connection already closed"),
            NetworkError::Timeout => write!(f, "network operation timed out"),
            NetworkError::DiscoveryUnavailable => write!(f, "discovery subsystem unavailable"),
            NetworkError::Io(msg) => write!(f, "i/o error: {msg}"),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Why an admission attempt was refused.
///
/// Never sent to the remote peer. A rejected connection is closed with no
/// explanation so an unpermitted node cannot tell "refused" from "offline".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Remote address is not in the permission registry
    NotPermitted,
    /// Remote address equals our own
    SelfConnection,
    /// A connection to this address is already active
    AlreadyConnected,
    /// Peer limit reached
    TooManyPeers,
    /// Node is shutting down
    ShuttingDown,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPermitted => write!(f, "Not permitted"),
            Self::SelfConnection => write!(f, "Self connection"),
            Self::AlreadyConnected => write!(f, "Already connected"),
            Self::TooManyPeers => write!(f, "Too many peers"),
            Self::ShuttingDown => write!(f, "Shutting down"),
        }
    }
}

/// Reasons why an active connection left the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Address was revoked after admission
    PermissionRevoked,
    /// Transport reported the link closed (either side)
    TransportClosed,
    /// Node shutdown
    Shutdown,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PermissionRevoked => write!(f, "Permission revoked"),
            Self::TransportClosed => write!(f, "Transport closed"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}
