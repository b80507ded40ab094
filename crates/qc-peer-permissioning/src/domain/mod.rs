//! Domain Layer - Pure access-control logic with no I/O
//!
//! This module contains:
//! - Identity resolution (public key -> address)
//! - The permission registry (mutable allow-list)
//! - The discovery filter (query and candidate checks)
//! - The connection gatekeeper (admission + active-connection table)

pub mod discovery_filter;
pub mod gatekeeper;
pub mod identity;
pub mod registry;
/// Core domain types (entities, values, errors)
pub mod types;

pub use discovery_filter::*;
pub use gatekeeper::*;
pub use identity::*;
pub use registry::*;
pub use types::*;
