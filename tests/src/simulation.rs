//! # Simulated Overlay
//!
//! An in-memory network of nodes, each running its own
//! [`PermissionService`]. The simulation plays the roles the host
//! application normally plays:
//!
//! - **discovery**: a node queries its bootnodes and known peers; the
//!   responder consults `on_discovery_query` and, if allowed, answers with
//!   its table, which the requester passes through `filter_candidates`
//! - **dialer**: every known candidate that passes `check_dial` is
//!   connected, and both ends run `on_handshake_complete`
//! - **transport**: closing one end of a link notifies the other end via
//!   `on_connection_closed`
//!
//! Lookups requested by the rediscovery tick are queued and executed by
//! [`SimNetwork::run_pending_lookups`], so tests decide when rounds happen.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use k256::ecdsa::SigningKey;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use qc_peer_permissioning::test_utils::FixedTimeSource;
use qc_peer_permissioning::{
    address_of, Address, AdmissionResult, Candidate, ConnectionDirection, ConnectionHandle,
    ConnectionHooks, DiscoveryHooks, LookupTrigger, NetworkError, PeerTransport, PermissionApi,
    PermissionConfig, PermissionService, PublicKey,
};

/// Generate a fresh node key.
pub fn new_key() -> SigningKey {
    SigningKey::random(&mut rand::thread_rng())
}

/// Public half of a node key.
pub fn public_key(key: &SigningKey) -> PublicKey {
    PublicKey::from(*key.verifying_key())
}

/// Address a node key resolves to.
pub fn address(key: &SigningKey) -> Address {
    address_of(&public_key(key))
}

/// One end of a link.
#[derive(Debug, Clone, Copy)]
struct LinkEnd {
    peer: usize,
    peer_handle: ConnectionHandle,
}

/// A node in the simulated overlay.
pub struct SimNode {
    pub index: usize,
    pub public_key: PublicKey,
    pub address: Address,
    pub endpoint: SocketAddr,
    pub service: Arc<PermissionService>,
    lookup: Arc<SimLookup>,
    bootnodes: Vec<usize>,
    /// Candidates this node has learned through discovery.
    table: Mutex<Vec<Candidate>>,
}

impl SimNode {
    fn record(&self) -> Candidate {
        Candidate::new(self.public_key.clone(), self.endpoint)
    }

    /// Addresses currently in this node's discovery table.
    pub fn known(&self) -> Vec<Address> {
        self.table.lock().iter().map(|c| c.address).collect()
    }

    /// Addresses of this node's active peers.
    pub fn peers(&self) -> Vec<Address> {
        self.service
            .list_active_peers()
            .into_iter()
            .map(|(address, _)| address)
            .collect()
    }

    fn learn(&self, candidates: Vec<Candidate>) {
        let mut table = self.table.lock();
        for candidate in candidates {
            if candidate.address != self.address
                && !table.iter().any(|c| c.address == candidate.address)
            {
                table.push(candidate);
            }
        }
    }
}

/// Transport half owned by one node.
struct SimTransport {
    network: Weak<SimNetwork>,
}

impl PeerTransport for SimTransport {
    fn close(&self, handle: ConnectionHandle) -> Result<(), NetworkError> {
        let network = self
            .network
            .upgrade()
            .ok_or_else(|| NetworkError::Io("network dropped".to_string()))?;
        network.close_link(handle)
    }
}

/// Lookup trigger that queues a round for later.
#[derive(Default)]
struct SimLookup {
    pending: AtomicBool,
}

impl LookupTrigger for SimLookup {
    fn trigger_lookup(&self) -> Result<(), NetworkError> {
        self.pending.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// The simulated overlay.
pub struct SimNetwork {
    this: Weak<SimNetwork>,
    nodes: RwLock<Vec<Arc<SimNode>>>,
    links: Mutex<HashMap<ConnectionHandle, LinkEnd>>,
    next_handle: AtomicU64,
}

impl SimNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            nodes: RwLock::new(Vec::new()),
            links: Mutex::new(HashMap::new()),
            next_handle: AtomicU64::new(1),
        })
    }

    /// Start a node with `key`, bootstrapping against `bootnodes`.
    pub fn add_node(
        &self,
        key: &SigningKey,
        config: PermissionConfig,
        bootnodes: &[usize],
    ) -> usize {
        let mut nodes = self.nodes.write();
        let index = nodes.len();
        let public_key = public_key(key);
        let address = address_of(&public_key);
        let lookup = Arc::new(SimLookup::default());
        let service = Arc::new(PermissionService::new(
            address,
            config,
            Arc::new(SimTransport {
                network: self.this.clone(),
            }),
            lookup.clone(),
            Box::new(FixedTimeSource::new(1_700_000_000 + index as u64)),
        ));
        let octet = u8::try_from(index + 1).unwrap_or(u8::MAX);

        nodes.push(Arc::new(SimNode {
            index,
            public_key,
            address,
            endpoint: SocketAddr::from(([10, 0, 0, octet], 30303)),
            service,
            lookup,
            bootnodes: bootnodes.to_vec(),
            table: Mutex::new(Vec::new()),
        }));
        debug!(index, %address, "sim node started");
        index
    }

    pub fn node(&self, index: usize) -> Arc<SimNode> {
        Arc::clone(&self.nodes.read()[index])
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn by_address(&self, address: &Address) -> Option<Arc<SimNode>> {
        self.nodes
            .read()
            .iter()
            .find(|n| n.address == *address)
            .cloned()
    }

    /// Number of live links (each counted once).
    pub fn link_count(&self) -> usize {
        self.links.lock().len() / 2
    }

    fn close_link(&self, handle: ConnectionHandle) -> Result<(), NetworkError> {
        let end = {
            let mut links = self.links.lock();
            let end = links.remove(&handle).ok_or(NetworkError::AlreadyClosed)?;
            links.remove(&end.peer_handle);
            end
        };
        // Lock released: the remote service may call back into the transport.
        self.node(end.peer)
            .service
            .on_connection_closed(end.peer_handle);
        Ok(())
    }

    // =========================================================================
    // DISCOVERY
    // =========================================================================

    /// One discovery round for `index`: query bootnodes and known peers,
    /// then dial everything learned.
    pub fn discover(&self, index: usize) {
        let node = self.node(index);
        let mut targets: Vec<Arc<SimNode>> =
            node.bootnodes.iter().map(|&b| self.node(b)).collect();
        for candidate in node.table.lock().iter() {
            if let Some(peer) = self.by_address(&candidate.address) {
                if !targets.iter().any(|t| t.index == peer.index) {
                    targets.push(peer);
                }
            }
        }

        for target in targets {
            self.query(&node, &target);
        }
        self.dial_known(&node);
    }

    fn query(&self, requester: &SimNode, responder: &SimNode) {
        let allowed = responder
            .service
            .on_discovery_query(&requester.public_key.to_compressed())
            .unwrap_or(false);
        if !allowed {
            debug!(from = requester.index, to = responder.index, "query dropped");
            return;
        }

        // Answering a query bonds the requester into the responder's table.
        responder.learn(responder.service.filter_candidates(vec![requester.record()]));

        let mut answer: Vec<Candidate> = responder.table.lock().clone();
        answer.push(responder.record());
        let answer = requester.service.filter_candidates(answer);
        requester.learn(answer);
    }

    fn dial_known(&self, node: &SimNode) {
        let candidates = node.table.lock().clone();
        for candidate in candidates {
            if node.service.check_dial(&candidate).is_accepted() {
                if let Some(target) = self.by_address(&candidate.address) {
                    self.connect(node, &target);
                }
            }
        }
    }

    /// Dial `to` from `from`, running admission on both ends.
    ///
    /// Returns each end's admission result; `None` means that end never saw
    /// the handshake because the link was already torn down.
    pub fn connect(
        &self,
        from: &SimNode,
        to: &SimNode,
    ) -> (Option<AdmissionResult>, Option<AdmissionResult>) {
        let out_handle = ConnectionHandle(self.next_handle.fetch_add(2, Ordering::SeqCst));
        let in_handle = ConnectionHandle(out_handle.0 + 1);
        {
            let mut links = self.links.lock();
            links.insert(
                out_handle,
                LinkEnd {
                    peer: to.index,
                    peer_handle: in_handle,
                },
            );
            links.insert(
                in_handle,
                LinkEnd {
                    peer: from.index,
                    peer_handle: out_handle,
                },
            );
        }

        let outbound = from
            .service
            .on_handshake_complete(
                ConnectionDirection::Outbound,
                &to.public_key.to_compressed(),
                to.endpoint,
                out_handle,
            )
            .ok();
        if !self.links.lock().contains_key(&in_handle) {
            return (outbound, None);
        }

        let inbound = to
            .service
            .on_handshake_complete(
                ConnectionDirection::Inbound,
                &from.public_key.to_compressed(),
                from.endpoint,
                in_handle,
            )
            .ok();
        debug!(from = from.index, to = to.index, ?outbound, ?inbound, "handshake");
        (outbound, inbound)
    }

    /// One discovery round on every node, in index order.
    pub fn discovery_round(&self) {
        for index in 0..self.len() {
            self.discover(index);
        }
    }

    /// Run a round for every node whose rediscovery tick queued a lookup.
    pub fn run_pending_lookups(&self) -> usize {
        let mut ran = 0;
        for index in 0..self.len() {
            if self.node(index).lookup.pending.swap(false, Ordering::SeqCst) {
                self.discover(index);
                ran += 1;
            }
        }
        ran
    }

    // =========================================================================
    // RECONCILIATION (manual ticks)
    // =========================================================================

    /// Rediscovery tick on every node, then the queued lookups.
    pub fn tick_rediscovery(&self) {
        for index in 0..self.len() {
            let _ = self.node(index).service.request_rediscovery();
        }
        self.run_pending_lookups();
    }

    /// Enforcement tick on every node. Returns the number of peers dropped.
    pub fn tick_enforcement(&self) -> usize {
        (0..self.len())
            .map(|index| self.node(index).service.enforce_permissions().disconnected.len())
            .sum()
    }

    /// Every node's active peers are permitted by that node.
    pub fn assert_symmetric(&self) {
        for index in 0..self.len() {
            let node = self.node(index);
            for peer in node.peers() {
                assert!(
                    node.service.is_permitted(&peer),
                    "node {index} holds unpermitted peer {peer}"
                );
            }
        }
    }
}
