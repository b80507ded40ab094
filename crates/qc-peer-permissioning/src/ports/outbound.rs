//! # Driven Ports (Outbound SPI)
//!
//! These are the interfaces this subsystem **requires** the host application
//! to implement.

use crate::domain::{ConnectionHandle, PermissionConfig, Timestamp};

pub use crate::domain::NetworkError;

/// Close primitive of the connection transport.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the enforcement tick and admission
/// paths call it concurrently.
pub trait PeerTransport: Send + Sync {
    /// Tear down `handle` without any further protocol exchange.
    ///
    /// Returning `NetworkError::AlreadyClosed` for a dead link is expected
    /// and treated as success. Any other error keeps the connection entry,
    /// and the next enforcement tick calls `close` again.
    ///
    /// May block. The reconciliation loop runs enforcement on tokio's
    /// blocking pool.
    fn close(&self, handle: ConnectionHandle) -> Result<(), NetworkError>;
}

/// Entry point into the discovery subsystem's lookup procedure.
pub trait LookupTrigger: Send + Sync {
    /// Start a lookup round now instead of waiting for the subsystem's own
    /// refresh cadence. Must not block on the round completing.
    fn trigger_lookup(&self) -> Result<(), NetworkError>;
}

/// Abstract interface for time-related operations.
///
/// Enables deterministic testing by injecting controllable time sources.
pub trait TimeSource: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Abstract interface for configuration loading.
pub trait ConfigProvider: Send + Sync {
    /// Startup permission configuration.
    fn get_permission_config(&self) -> PermissionConfig;
}
