//! Ports Layer - Hexagonal Architecture interfaces
//!
//! - **Inbound (Driving) Ports:** the API and hooks this subsystem exposes
//! - **Outbound (Driven) Ports:** interfaces the host must implement

pub mod inbound;
pub mod outbound;

pub use inbound::{ConnectionHooks, DiscoveryHooks, PermissionApi};
pub use outbound::{ConfigProvider, LookupTrigger, NetworkError, PeerTransport, TimeSource};
