//! Neighbor and forwarding engine
//!
//! Outbound sends use short-lived sockets bound to this node's own
//! address; the socket is released when it goes out of scope on every
//! exit path.

use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::warn;
use vectormesh_protocol::{encode_hello, encode_update, NodeAddr};
use vectormesh_routing::{Result, RoutingTable};

/// Maps a node address to the UDP port it listens on: a shared base port
/// plus the address's numeric suffix. The mapping is configuration, not
/// arithmetic hard-coded at call sites, so deployments with a different
/// host-numbering convention only change it here.
#[derive(Debug, Clone, Copy)]
pub struct PortMap {
    base_port: u16,
}

impl PortMap {
    pub const DEFAULT_BASE_PORT: u16 = 4300;

    pub fn new(base_port: u16) -> Self {
        PortMap { base_port }
    }

    /// The listening port for a node
    pub fn port_for(&self, addr: NodeAddr) -> u16 {
        self.base_port + u16::from(addr.suffix())
    }

    /// The full listening socket address for a node
    pub fn socket_addr(&self, addr: NodeAddr) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::from(addr), self.port_for(addr)))
    }
}

impl Default for PortMap {
    fn default() -> Self {
        PortMap::new(Self::DEFAULT_BASE_PORT)
    }
}

/// Sends Update advertisements to the configured neighbors and forwards
/// Hello messages along the best known next hop.
pub struct Engine {
    own_addr: NodeAddr,
    neighbors: Vec<NodeAddr>,
    ports: PortMap,
}

impl Engine {
    pub fn new(own_addr: NodeAddr, neighbors: Vec<NodeAddr>, ports: PortMap) -> Self {
        Engine {
            own_addr,
            neighbors,
            ports,
        }
    }

    /// The configured direct neighbors
    pub fn neighbors(&self) -> &[NodeAddr] {
        &self.neighbors
    }

    /// Advertise the full table to every configured neighbor.
    ///
    /// A failed send is logged and skipped; one unreachable neighbor must
    /// not starve the others, and the periodic re-advertisement is the
    /// only loss recovery the protocol has.
    pub async fn broadcast_updates(&self, table: &RoutingTable) {
        let msg = encode_update(table.entries());

        for &neighbor in &self.neighbors {
            if let Err(e) = self.send_datagram(&msg, neighbor).await {
                warn!("update send to {} failed: {}", neighbor, e);
            }
        }
    }

    /// Send a Hello one hop toward its destination, resolving the next hop
    /// from the table. Returns the neighbor the message was handed to.
    ///
    /// A destination with no table entry is a recoverable error for the
    /// caller to log, not a crash; in normal operation destinations are
    /// only picked from known table keys.
    pub async fn forward_hello(
        &self,
        text: &str,
        source: NodeAddr,
        destination: NodeAddr,
        table: &RoutingTable,
    ) -> Result<NodeAddr> {
        let next_hop = table.next_hop(&destination)?;
        let msg = encode_hello(text, source, destination);

        self.send_datagram(&msg, next_hop).await?;
        Ok(next_hop)
    }

    async fn send_datagram(&self, msg: &[u8], to: NodeAddr) -> std::io::Result<()> {
        let socket =
            UdpSocket::bind(SocketAddr::from((Ipv4Addr::from(self.own_addr), 0))).await?;
        socket.send_to(msg, self.ports.socket_addr(to)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_map() {
        let ports = PortMap::new(4300);
        let addr: NodeAddr = "127.0.0.3".parse().unwrap();

        assert_eq!(ports.port_for(addr), 4303);
        assert_eq!(ports.socket_addr(addr), "127.0.0.3:4303".parse().unwrap());
    }

    #[test]
    fn test_port_map_default_base() {
        let addr: NodeAddr = "10.0.0.1".parse().unwrap();
        assert_eq!(PortMap::default().port_for(addr), PortMap::DEFAULT_BASE_PORT + 1);
    }
}
