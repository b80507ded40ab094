use std::sync::Arc;

use crate::domain::{
    Address, ConnectionGatekeeper, ConnectionStats, DiscoveryFilter, PermissionConfig,
    PermissionRegistry, Timestamp,
};
use crate::ports::{LookupTrigger, PeerTransport, TimeSource};

/// Permissioning service wiring the registry, discovery filter and
/// gatekeeper to the host's transport and discovery ports.
///
/// Every component shares one injected [`PermissionRegistry`]; there is no
/// process-wide state.
///
/// # Example
///
/// ```rust,ignore
/// use qc_peer_permissioning::service::PermissionService;
/// use qc_peer_permissioning::ports::PermissionApi;
///
/// let service = PermissionService::new(
///     local_address,
///     PermissionConfig::default().with_permitted(vec![peer_a, peer_b]),
///     transport,
///     discovery,
///     Box::new(SystemTimeSource::new()),
/// );
///
/// service.grant(&new_validator_key);
/// let report = service.enforce_permissions();
/// ```
pub struct PermissionService {
    /// Shared allow-list
    pub(crate) registry: Arc<PermissionRegistry>,
    /// Discovery enforcement point
    pub(crate) filter: DiscoveryFilter,
    /// Connection enforcement point and active-connection table
    pub(crate) gatekeeper: ConnectionGatekeeper,
    /// Transport close primitive
    pub(crate) transport: Arc<dyn PeerTransport>,
    /// Discovery lookup entry point
    pub(crate) lookup: Arc<dyn LookupTrigger>,
    /// Time source for establishment timestamps
    pub(crate) time_source: Box<dyn TimeSource>,
    pub(crate) config: PermissionConfig,
}

impl PermissionService {
    /// Create a service with a registry built from `config`.
    pub fn new(
        local_address: Address,
        config: PermissionConfig,
        transport: Arc<dyn PeerTransport>,
        lookup: Arc<dyn LookupTrigger>,
        time_source: Box<dyn TimeSource>,
    ) -> Self {
        let registry = Arc::new(PermissionRegistry::from_config(local_address, &config));
        Self::with_registry(registry, config, transport, lookup, time_source)
    }

    /// Create a service around an existing registry.
    ///
    /// `config.permitted` is ignored; the registry is used as-is.
    pub fn with_registry(
        registry: Arc<PermissionRegistry>,
        config: PermissionConfig,
        transport: Arc<dyn PeerTransport>,
        lookup: Arc<dyn LookupTrigger>,
        time_source: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            filter: DiscoveryFilter::new(Arc::clone(&registry)),
            gatekeeper: ConnectionGatekeeper::new(Arc::clone(&registry), config.max_peers),
            registry,
            transport,
            lookup,
            time_source,
            config,
        }
    }

    /// Get the current timestamp from the time source.
    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Shared registry handle.
    pub fn registry(&self) -> &Arc<PermissionRegistry> {
        &self.registry
    }

    /// Discovery filter (for hosts that call it directly).
    pub fn discovery_filter(&self) -> &DiscoveryFilter {
        &self.filter
    }

    /// Gatekeeper and its active-connection table.
    pub fn gatekeeper(&self) -> &ConnectionGatekeeper {
        &self.gatekeeper
    }

    /// Configuration the service was built with.
    pub fn config(&self) -> &PermissionConfig {
        &self.config
    }

    /// Our own address.
    pub fn local_address(&self) -> Address {
        self.registry.local_address()
    }

    /// Connection statistics.
    pub fn connection_stats(&self) -> ConnectionStats {
        self.gatekeeper.stats()
    }
}
