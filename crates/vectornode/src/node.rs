//! The event loop: one running node
//!
//! Strictly single-threaded and cooperative. The only suspension point is
//! the bounded wait for socket readiness, so every relaxation, broadcast,
//! and random action happens sequentially within one loop body and the
//! routing table needs no locking.

use anyhow::{Context, Result};
use rand::seq::IteratorRandom;
use rand::Rng;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use vectormesh_protocol::{decode_hello, decode_update, MessageKind, NodeAddr};
use vectormesh_routing::RoutingTable;

use crate::config::NodeConfig;
use crate::engine::{Engine, PortMap};

/// Bounded wait for socket readiness per loop iteration. A timeout is not
/// an error; it loops back so the random proactive actions get a chance
/// to fire even with no incoming traffic.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive buffer size, comfortably above any full-table advertisement
const MAX_DATAGRAM: usize = 1024;

/// Draw value that triggers a proactive Update broadcast
const UPDATE_DRAW: u8 = 1;

/// Draw value that triggers a synthetic Hello
const HELLO_DRAW: u8 = 5;

/// Bodies for synthetic Hello traffic
const HELLO_BODIES: &[&str] = &[
    "Cosmic Cuttlefish",
    "Bionic Beaver",
    "Xenial Xerus",
    "Trusty Tahr",
    "Precise Pangolin",
];

/// One node process: the routing table, the forwarding engine, the
/// listening socket, and the traffic-generation randomness.
///
/// The randomness is injected so tests can force deterministic action
/// sequences with a seeded generator.
pub struct Node<R> {
    table: RoutingTable,
    engine: Engine,
    socket: UdpSocket,
    rng: R,
}

impl<R: Rng> Node<R> {
    /// Build the initial table from the configured neighbors and bind the
    /// listening socket.
    pub async fn bind(config: NodeConfig, ports: PortMap, rng: R) -> Result<Self> {
        let neighbors = config.neighbors.iter().map(|(addr, _)| *addr).collect();
        let table = RoutingTable::with_neighbors(config.address, config.neighbors.iter().copied());
        let engine = Engine::new(config.address, neighbors, ports);

        info!("{} here", config.address);

        let bind_addr = ports.socket_addr(config.address);
        let socket = UdpSocket::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind listening socket {bind_addr}"))?;
        info!("binding to {}", bind_addr);

        log_table(&table);

        Ok(Node {
            table,
            engine,
            socket,
            rng,
        })
    }

    /// The current routing table
    pub fn table(&self) -> &RoutingTable {
        &self.table
    }

    /// Run until the process is killed. Transport errors never terminate
    /// the loop; the current iteration is abandoned and the next readiness
    /// wait begins.
    pub async fn run(&mut self) -> Result<()> {
        // Advertise once up front so neighbors learn this node without
        // waiting for a random draw.
        self.engine.broadcast_updates(&self.table).await;

        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            self.maybe_act().await;

            match timeout(RECV_TIMEOUT, self.socket.recv_from(&mut buf)).await {
                Err(_) => continue,
                Ok(Err(e)) => warn!("receive failed: {}", e),
                Ok(Ok((len, from))) => self.handle_datagram(&buf[..len], from).await,
            }
        }
    }

    /// One uniform 0-9 draw decides the iteration's proactive action: one
    /// value triggers an Update broadcast, a different value a synthetic
    /// Hello, every other value nothing. The branches are mutually
    /// exclusive on the same draw, which bounds the proactive traffic
    /// rate to 1/10 each.
    async fn maybe_act(&mut self) {
        let draw: u8 = self.rng.gen_range(0..10);

        if draw == UPDATE_DRAW {
            self.engine.broadcast_updates(&self.table).await;
        } else if draw == HELLO_DRAW {
            let Some(destination) = self.table.destinations().choose(&mut self.rng) else {
                return;
            };
            let text = HELLO_BODIES[self.rng.gen_range(0..HELLO_BODIES.len())];

            match self
                .engine
                .forward_hello(text, self.table.own_addr(), destination, &self.table)
                .await
            {
                Ok(next_hop) => info!("sending {} to {} via {}", text, destination, next_hop),
                Err(e) => warn!("hello send to {} failed: {}", destination, e),
            }
        }
    }

    /// Process one received datagram. Datagrams with an unrecognized type
    /// tag or that fail to decode are dropped.
    pub async fn handle_datagram(&mut self, bytes: &[u8], from: SocketAddr) {
        match bytes.first().copied().and_then(MessageKind::from_tag) {
            Some(MessageKind::Hello) => self.handle_hello(bytes).await,
            Some(MessageKind::Update) => self.handle_update(bytes, from).await,
            None => debug!("dropping datagram with unrecognized tag from {}", from),
        }
    }

    async fn handle_hello(&mut self, bytes: &[u8]) {
        let hello = match decode_hello(bytes) {
            Ok(hello) => hello,
            Err(e) => {
                debug!("dropping malformed hello: {}", e);
                return;
            }
        };

        if hello.destination == self.table.own_addr() {
            // Arrived: delivered to the local sink, never re-sent.
            info!("received {} from {}", hello.text, hello.source);
            return;
        }

        match self
            .engine
            .forward_hello(&hello.text, hello.source, hello.destination, &self.table)
            .await
        {
            Ok(next_hop) => info!(
                "forwarding {} to {} via {}",
                hello.text, hello.destination, next_hop
            ),
            Err(e) => warn!("hello forward to {} failed: {}", hello.destination, e),
        }
    }

    async fn handle_update(&mut self, bytes: &[u8], from: SocketAddr) {
        let entries = match decode_update(bytes) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("dropping malformed update: {}", e);
                return;
            }
        };

        // The advertisement is attributed to the datagram's source address.
        let sender = match from {
            SocketAddr::V4(v4) => NodeAddr::from(*v4.ip()),
            SocketAddr::V6(_) => {
                debug!("dropping update from non-IPv4 source {}", from);
                return;
            }
        };

        match self.table.apply_update(sender, &entries) {
            Ok(true) => {
                info!("updated table with information from {}", sender);
                log_table(&self.table);
                // Triggered update: re-advertise immediately on change.
                self.engine.broadcast_updates(&self.table).await;
            }
            Ok(false) => {}
            Err(e) => debug!("rejecting update from {}: {}", from, e),
        }
    }
}

/// Log a snapshot of the table, one destination per line in table order
fn log_table(table: &RoutingTable) {
    info!("{:^14} {:^10} {:^14}", "Host", "Cost", "Via");
    for (destination, route) in table.iter() {
        info!(
            "{:^14} {:^10} {:^14}",
            destination.to_string(),
            route.cost,
            route.next_hop.to_string()
        );
    }
}
