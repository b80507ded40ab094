//! # Permission Registry
//!
//! The single source of truth for "who may join". Consulted synchronously by
//! the discovery filter and the gatekeeper, and polled by the
//! reconciliation loop through snapshots.

// Semantic submodules
mod manager;
mod set;

// Re-export public API
pub use manager::PermissionRegistry;
pub use set::{PermissionSet, PermissionSnapshot};
