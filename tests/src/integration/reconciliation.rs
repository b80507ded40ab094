//! # Timer-Driven Reconciliation
//!
//! The grant / revoke lifecycle with every node running its own
//! `ReconciliationLoop`, on tokio's paused clock.
//!
//! A driver task stands in for the discovery subsystem: it executes the
//! lookups queued by the rediscovery ticks.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use qc_peer_permissioning::{
        PermissionApi, PermissionConfig, ReconcilerHandle, ReconciliationLoop,
    };
    use tokio::sync::watch;
    use tokio::task::JoinHandle;
    use tokio::time::sleep;

    use crate::init_test_logging;
    use crate::simulation::{address, new_key, public_key, SimNetwork};

    const ENFORCEMENT: Duration = Duration::from_secs(1);
    const REDISCOVERY: Duration = Duration::from_secs(5);
    const DRIVER_PERIOD: Duration = Duration::from_millis(100);

    fn config() -> PermissionConfig {
        PermissionConfig {
            enforcement_interval: ENFORCEMENT,
            rediscovery_interval: REDISCOVERY,
            ..PermissionConfig::default()
        }
    }

    /// Run queued lookups every `DRIVER_PERIOD` until told to stop.
    fn spawn_driver(net: Arc<SimNetwork>) -> (watch::Sender<bool>, JoinHandle<()>) {
        let (tx, mut rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(DRIVER_PERIOD);
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        net.run_pending_lookups();
                    }
                    _ = rx.changed() => break,
                }
            }
        });
        (tx, task)
    }

    fn spawn_loops(net: &SimNetwork) -> Vec<ReconcilerHandle> {
        (0..net.len())
            .map(|i| ReconciliationLoop::new(Arc::clone(&net.node(i).service)).spawn())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_grant_and_revoke_converge_within_one_period() {
        init_test_logging();
        let net = SimNetwork::new();
        let (key_a, key_b, key_n) = (new_key(), new_key(), new_key());

        let boot = net.add_node(
            &new_key(),
            config().with_permitted([address(&key_a), address(&key_b)]),
            &[],
        );
        net.add_node(&key_a, config(), &[boot]);
        net.add_node(&key_b, config(), &[boot]);
        let n = net.add_node(&key_n, config(), &[boot]);

        let loops = spawn_loops(&net);
        let (driver_tx, driver) = spawn_driver(Arc::clone(&net));

        // Two full rediscovery cycles.
        sleep(REDISCOVERY * 2 + Duration::from_millis(500)).await;
        assert_eq!(net.node(n).service.active_peer_count(), 0);
        assert_eq!(net.node(boot).service.active_peer_count(), 2);

        net.node(boot).service.grant(&public_key(&key_n));
        sleep(REDISCOVERY + DRIVER_PERIOD * 2).await;
        assert!(net.node(boot).peers().contains(&address(&key_n)));

        net.node(boot).service.revoke(&public_key(&key_n));
        sleep(ENFORCEMENT + DRIVER_PERIOD).await;
        let boot_peers = net.node(boot).peers();
        assert!(!boot_peers.contains(&address(&key_n)));
        assert_eq!(boot_peers.len(), 2);
        net.assert_symmetric();

        let _ = driver_tx.send(true);
        driver.await.unwrap();
        for handle in loops {
            handle.shutdown().await;
        }
        assert_eq!(net.link_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revoked_peer_stays_connected_until_enforcement_tick() {
        init_test_logging();
        let net = SimNetwork::new();
        let key_a = new_key();
        let boot = net.add_node(&new_key(), config().with_permitted([address(&key_a)]), &[]);
        let a = net.add_node(&key_a, config(), &[boot]);
        net.discovery_round();
        assert_eq!(net.node(boot).service.active_peer_count(), 1);

        let handle =
            ReconciliationLoop::new(Arc::clone(&net.node(boot).service)).spawn();
        net.node(boot).service.revoke(&public_key(&key_a));

        sleep(ENFORCEMENT / 2).await;
        assert_eq!(net.node(boot).service.active_peer_count(), 1);

        sleep(ENFORCEMENT).await;
        assert_eq!(net.node(boot).service.active_peer_count(), 0);
        assert_eq!(net.node(a).service.active_peer_count(), 0);

        handle.shutdown().await;
    }
}
