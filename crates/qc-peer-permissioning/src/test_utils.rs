//! Test utilities for peer permissioning.
//!
//! Mock implementations of the driven ports for deterministic testing.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use qc_peer_permissioning::test_utils::FixedTimeSource;
//! use qc_peer_permissioning::TimeSource;
//!
//! let time_source = FixedTimeSource::new(1000);
//! assert_eq!(time_source.now().as_secs(), 1000);
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::domain::{ConnectionHandle, Timestamp};
use crate::ports::{LookupTrigger, NetworkError, PeerTransport, TimeSource};

/// A time source that returns a fixed timestamp.
#[derive(Debug, Clone)]
pub struct FixedTimeSource {
    timestamp: u64,
}

impl FixedTimeSource {
    /// Create a new fixed time source with the given timestamp (in seconds).
    pub fn new(timestamp: u64) -> Self {
        Self { timestamp }
    }
}

impl TimeSource for FixedTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.timestamp)
    }
}

/// Thread-safe time source that tests can advance.
#[derive(Debug, Default)]
pub struct ControllableTimeSource {
    time: AtomicU64,
}

impl ControllableTimeSource {
    /// Start the clock at `initial` seconds.
    pub fn new(initial: u64) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    /// Advance the clock by `secs`.
    pub fn advance(&self, secs: u64) {
        self.time.fetch_add(secs, Ordering::SeqCst);
    }
}

impl TimeSource for ControllableTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.time.load(Ordering::SeqCst))
    }
}

/// Transport that records every close request.
///
/// Handles marked with [`mark_dead`](Self::mark_dead) answer
/// `NetworkError::AlreadyClosed`, and [`fail_closes`](Self::fail_closes)
/// makes every close fail with an I/O error.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    closed: Mutex<Vec<ConnectionHandle>>,
    dead: Mutex<HashSet<ConnectionHandle>>,
    failing: AtomicBool,
}

impl RecordingTransport {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every handle passed to `close`, in call order.
    pub fn closed(&self) -> Vec<ConnectionHandle> {
        self.closed.lock().clone()
    }

    /// Whether `close(handle)` was called.
    pub fn was_closed(&self, handle: ConnectionHandle) -> bool {
        self.closed.lock().contains(&handle)
    }

    /// Pretend `handle` already died on the remote side.
    pub fn mark_dead(&self, handle: ConnectionHandle) {
        self.dead.lock().insert(handle);
    }

    /// Make every subsequent close fail.
    pub fn fail_closes(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl PeerTransport for RecordingTransport {
    fn close(&self, handle: ConnectionHandle) -> Result<(), NetworkError> {
        self.closed.lock().push(handle);
        if self.failing.load(Ordering::SeqCst) {
            return Err(NetworkError::Io("simulated close failure".to_string()));
        }
        if self.dead.lock().contains(&handle) {
            return Err(NetworkError::AlreadyClosed);
        }
        Ok(())
    }
}

/// Lookup trigger that counts invocations.
#[derive(Debug, Default)]
pub struct CountingLookupTrigger {
    count: AtomicUsize,
    unavailable: AtomicBool,
}

impl CountingLookupTrigger {
    /// Create a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lookups triggered so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Make subsequent triggers fail with `DiscoveryUnavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl LookupTrigger for CountingLookupTrigger {
    fn trigger_lookup(&self) -> Result<(), NetworkError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(NetworkError::DiscoveryUnavailable);
        }
        Ok(())
    }
}
