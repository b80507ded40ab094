//! # Connection Gatekeeper
//!
//! Admission control at inbound accept and outbound dial, and ownership of
//! the active-connection table.
//!
//! ## State Machine
//!
//! ```text
//! Pending ──check_dial / admit──→ Rejected   (torn down, no explanation)
//!    │
//!    └──────────admit────────────→ Active ──on_closed / release──→ Closed
//! ```
//!
//! Permission is checked at admission only. Revocations after admission are
//! caught by the reconciliation loop's enforcement tick.

// Semantic submodules
mod manager;
mod types;

// Re-export public API
pub use manager::ConnectionGatekeeper;
pub use types::{AdmissionResult, ConnectionStats};
