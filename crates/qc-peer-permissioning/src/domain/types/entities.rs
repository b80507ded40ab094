//! Core Domain Entities for Peer Permissioning

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use k256::ecdsa::VerifyingKey;

use super::errors::PermissionError;

/// Length of an [`Address`] in bytes.
pub const ADDRESS_LEN: usize = 20;

/// 20-byte node address derived from a secp256k1 public key.
///
/// The address is the unit of identity for every permission decision.
/// It is computed once by [`address_of`](crate::domain::address_of) and
/// compared by value; raw public keys are never compared directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LEN]);

impl Address {
    /// Create an Address from raw bytes.
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = PermissionError;

    /// Parse a hex address with an optional `0x` prefix, either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let bytes = hex::decode(digits).map_err(|_| PermissionError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] = bytes
            .try_into()
            .map_err(|_| PermissionError::InvalidAddress(s.to_string()))?;

        Ok(Self(bytes))
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Validated secp256k1 public key of a remote node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Parse a SEC1-encoded key (33-byte compressed or 65-byte uncompressed).
    ///
    /// # Errors
    ///
    /// `PermissionError::MalformedKey` if the bytes are not a point on the curve.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, PermissionError> {
        VerifyingKey::from_sec1_bytes(bytes)
            .map(Self)
            .map_err(|_| PermissionError::MalformedKey { len: bytes.len() })
    }

    /// Uncompressed SEC1 encoding (65 bytes, `0x04` tag first).
    pub fn to_uncompressed(&self) -> [u8; 65] {
        let point = self.0.to_encoded_point(false);
        let mut out = [0u8; 65];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// Compressed SEC1 encoding (33 bytes).
    pub fn to_compressed(&self) -> Vec<u8> {
        self.0.to_encoded_point(true).as_bytes().to_vec()
    }

    /// Access the underlying verifying key.
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.0
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key)
    }
}

/// Opaque handle the transport issues for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionHandle(pub u64);

impl fmt::Display for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

/// Direction of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionDirection {
    /// We dialed the peer
    Outbound,
    /// The peer dialed us
    Inbound,
}

impl fmt::Display for ConnectionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outbound => write!(f, "outbound"),
            Self::Inbound => write!(f, "inbound"),
        }
    }
}

/// Node record learned through the discovery protocol.
///
/// Candidates are ephemeral: the discovery subsystem produces them and the
/// discovery filter decides whether they are surfaced as dial targets or
/// returned in a query response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Address derived from `public_key`.
    pub address: Address,
    /// Network endpoint advertised by the record.
    pub endpoint: SocketAddr,
    /// Public key advertised by the record.
    pub public_key: PublicKey,
}

impl Candidate {
    /// Create a candidate, deriving its address from the key.
    pub fn new(public_key: PublicKey, endpoint: SocketAddr) -> Self {
        Self {
            address: crate::domain::address_of(&public_key),
            endpoint,
            public_key,
        }
    }
}

/// One established link to a remote node.
///
/// Owned by the gatekeeper's active-connection table from activation until
/// the transport reports the close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerConnection {
    /// Remote address (derived from `public_key`).
    pub address: Address,
    /// Remote public key from the identity handshake.
    pub public_key: PublicKey,
    /// Remote endpoint.
    pub endpoint: SocketAddr,
    /// Transport handle used to close the link.
    pub handle: ConnectionHandle,
    /// Who initiated the connection.
    pub direction: ConnectionDirection,
    /// When the connection became active.
    pub established_at: Timestamp,
}

/// Unix timestamp in seconds
///
/// Timestamps are clamped to a reasonable maximum so ordering by
/// establishment time never overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Maximum reasonable timestamp (year 9999).
    pub const MAX_REASONABLE: u64 = 253_402_300_799;

    /// Create a new timestamp, clamping to MAX_REASONABLE.
    pub fn new(secs: u64) -> Self {
        Self(secs.min(Self::MAX_REASONABLE))
    }

    /// Whole seconds since the Unix epoch. Readings before the epoch map to 0.
    pub fn from_system_time(at: SystemTime) -> Self {
        at.duration_since(UNIX_EPOCH)
            .map_or(Self(0), |elapsed| Self::new(elapsed.as_secs()))
    }

    /// Get the underlying seconds value.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Add seconds to timestamp (saturating at MAX_REASONABLE).
    pub fn add_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs).min(Self::MAX_REASONABLE))
    }
}
