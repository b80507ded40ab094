//! # Permission Service
//!
//! High-level service implementing the `PermissionApi`, `DiscoveryHooks` and
//! `ConnectionHooks` ports.
//!
//! The service wraps the domain registry, filter and gatekeeper, closes
//! refused links through the transport port, and exposes the two
//! reconciliation ticks as plain methods so they can be driven by a timer
//! task or called directly in tests.

// Semantic submodules
mod api;
mod core;
mod maintenance;

// Re-export public API
pub use self::core::PermissionService;
pub use maintenance::EnforcementReport;
