//! # Quantum-Chain Permissioning Test Suite
//!
//! Unified test crate for the permissioned overlay.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── simulation.rs     # In-memory overlay: nodes, links, discovery rounds
//! └── integration/      # Multi-node scenarios
//!     ├── permissioned_discovery.rs
//!     ├── reconciliation.rs
//!     └── configuration.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # With logs
//! RUST_LOG=qc_peer_permissioning=debug cargo test -p qc-tests -- --nocapture
//!
//! # Benchmarks
//! cargo bench -p qc-tests
//! ```

#![allow(dead_code)]

pub mod simulation;

/// Install a test-friendly tracing subscriber once per process.
///
/// Filtering follows `RUST_LOG`; output goes through the test writer so it
/// only shows for failing tests or with `--nocapture`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
