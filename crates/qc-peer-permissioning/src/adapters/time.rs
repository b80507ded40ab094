use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use crate::domain::Timestamp;
use crate::ports::TimeSource;

/// Wall-clock source for connection establishment stamps.
///
/// The wall clock can step backwards under NTP or a manual change. Stamps
/// handed out by one source never decrease, so peers admitted later never
/// sort ahead of earlier ones in `list_active_peers`.
///
/// ```rust
/// use qc_peer_permissioning::adapters::SystemTimeSource;
/// use qc_peer_permissioning::ports::TimeSource;
///
/// let clock = SystemTimeSource::new();
/// let first = clock.now();
/// assert!(clock.now() >= first);
/// ```
#[derive(Debug, Default)]
pub struct SystemTimeSource {
    high_water: AtomicU64,
}

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a wall reading into the high-water mark.
    fn stamp(&self, wall: Timestamp) -> Timestamp {
        let secs = wall.as_secs();
        let prev = self.high_water.fetch_max(secs, Ordering::Relaxed);
        Timestamp::new(prev.max(secs))
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        self.stamp(Timestamp::from_system_time(SystemTime::now()))
    }
}
