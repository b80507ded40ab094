//! # Reconciliation Loop
//!
//! Two independent periodic tasks drive the service:
//!
//! - **enforcement**: every `enforcement_interval`, disconnect active peers
//!   the registry no longer permits
//! - **rediscovery**: every `rediscovery_interval`, ask discovery for a fresh
//!   lookup so newly granted peers are found
//!
//! Each task owns its own shutdown channel, so either timer can be cancelled
//! without touching the other. A tick that overruns its period delays the
//! next one instead of bursting to catch up.
//!
//! Tick bodies call into the host's transport and discovery ports, which may
//! block. They run on tokio's blocking pool so a slow `close` never parks a
//! runtime worker.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::service::PermissionService;

/// Builder for the two reconciliation tasks.
pub struct ReconciliationLoop {
    service: Arc<PermissionService>,
    enforcement_interval: Duration,
    rediscovery_interval: Duration,
}

impl ReconciliationLoop {
    /// Use the periods from the service's configuration.
    pub fn new(service: Arc<PermissionService>) -> Self {
        let config = service.config();
        let enforcement_interval = config.enforcement_interval;
        let rediscovery_interval = config.rediscovery_interval;
        Self {
            service,
            enforcement_interval,
            rediscovery_interval,
        }
    }

    /// Override both periods. Zero periods are bumped to one millisecond.
    #[must_use]
    pub fn with_intervals(mut self, enforcement: Duration, rediscovery: Duration) -> Self {
        self.enforcement_interval = enforcement;
        self.rediscovery_interval = rediscovery;
        self
    }

    /// Spawn both tasks on the current tokio runtime.
    pub fn spawn(self) -> ReconcilerHandle {
        let (enforcement_tx, enforcement_rx) = watch::channel(false);
        let (rediscovery_tx, rediscovery_rx) = watch::channel(false);

        let service = Arc::clone(&self.service);
        let enforcement = tokio::spawn(run_periodic(
            "enforcement",
            self.enforcement_interval,
            enforcement_rx,
            move || {
                service.enforce_permissions();
            },
        ));

        let service = Arc::clone(&self.service);
        let rediscovery = tokio::spawn(run_periodic(
            "rediscovery",
            self.rediscovery_interval,
            rediscovery_rx,
            move || {
                // Failure is logged by the service; the next tick retries.
                let _ = service.request_rediscovery();
            },
        ));

        info!(
            enforcement_ms = self.enforcement_interval.as_millis() as u64,
            rediscovery_ms = self.rediscovery_interval.as_millis() as u64,
            "reconciliation loop started"
        );

        ReconcilerHandle {
            service: self.service,
            enforcement_tx,
            rediscovery_tx,
            enforcement,
            rediscovery,
        }
    }
}

async fn run_periodic<F>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    tick: F,
) where
    F: Fn() + Send + Sync + 'static,
{
    let tick = Arc::new(tick);
    let period = period.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!(task = name, "reconciliation tick");
                let job = Arc::clone(&tick);
                if let Err(e) = tokio::task::spawn_blocking(move || job()).await {
                    warn!(task = name, error = %e, "reconciliation tick panicked");
                }
            }
            _ = shutdown.changed() => {
                debug!(task = name, "reconciliation task stopped");
                break;
            }
        }
    }
}

/// Running reconciliation tasks.
///
/// Dropping the handle stops both timers at their next poll, since the
/// shutdown senders close. Use [`shutdown`](Self::shutdown) to also close
/// every active connection.
pub struct ReconcilerHandle {
    service: Arc<PermissionService>,
    enforcement_tx: watch::Sender<bool>,
    rediscovery_tx: watch::Sender<bool>,
    enforcement: JoinHandle<()>,
    rediscovery: JoinHandle<()>,
}

impl ReconcilerHandle {
    /// Stop the enforcement timer only.
    pub fn cancel_enforcement(&self) {
        let _ = self.enforcement_tx.send(true);
    }

    /// Stop the rediscovery timer only.
    pub fn cancel_rediscovery(&self) {
        let _ = self.rediscovery_tx.send(true);
    }

    /// Whether the enforcement task has exited.
    pub fn enforcement_finished(&self) -> bool {
        self.enforcement.is_finished()
    }

    /// Whether the rediscovery task has exited.
    pub fn rediscovery_finished(&self) -> bool {
        self.rediscovery.is_finished()
    }

    /// Stop both timers, wait for them to exit, then close every active
    /// connection. Returns the number of connections closed.
    pub async fn shutdown(self) -> usize {
        self.cancel_enforcement();
        self.cancel_rediscovery();

        for (name, task) in [
            ("enforcement", self.enforcement),
            ("rediscovery", self.rediscovery),
        ] {
            if let Err(e) = task.await {
                warn!(task = name, error = %e, "reconciliation task ended abnormally");
            }
        }

        self.service.shutdown()
    }
}
