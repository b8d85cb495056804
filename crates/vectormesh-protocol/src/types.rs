//! Core protocol types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Size of a node address on the wire (4 bytes)
pub const ADDR_SIZE: usize = 4;

/// A node address: four octets written on the wire in dotted-decimal
/// segment order.
///
/// Doubles as the routing-table key and the wire-format field, so it must
/// stay exactly four bytes wide.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeAddr([u8; ADDR_SIZE]);

impl NodeAddr {
    /// Create a NodeAddr from its four octets
    pub fn from_octets(octets: [u8; ADDR_SIZE]) -> Self {
        NodeAddr(octets)
    }

    /// Get the octets of this address
    pub fn octets(&self) -> [u8; ADDR_SIZE] {
        self.0
    }

    /// Get the address bytes in wire order
    pub fn as_bytes(&self) -> &[u8; ADDR_SIZE] {
        &self.0
    }

    /// The per-node numeric suffix (last octet), used by the
    /// base-port + suffix listening-port convention.
    pub fn suffix(&self) -> u8 {
        self.0[3]
    }
}

impl fmt::Debug for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeAddr({})", self)
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl FromStr for NodeAddr {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; ADDR_SIZE];
        let mut segments = s.split('.');

        for octet in octets.iter_mut() {
            let segment = segments
                .next()
                .ok_or_else(|| ProtocolError::InvalidAddress(s.to_string()))?;
            *octet = segment
                .parse()
                .map_err(|_| ProtocolError::InvalidAddress(s.to_string()))?;
        }

        if segments.next().is_some() {
            return Err(ProtocolError::InvalidAddress(s.to_string()));
        }

        Ok(NodeAddr(octets))
    }
}

impl From<NodeAddr> for Ipv4Addr {
    fn from(addr: NodeAddr) -> Self {
        Ipv4Addr::from(addr.0)
    }
}

impl From<Ipv4Addr> for NodeAddr {
    fn from(addr: Ipv4Addr) -> Self {
        NodeAddr(addr.octets())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_format_round_trip() {
        let addr: NodeAddr = "127.0.0.3".parse().unwrap();
        assert_eq!(addr.octets(), [127, 0, 0, 3]);
        assert_eq!(addr.to_string(), "127.0.0.3");
    }

    #[test]
    fn test_suffix() {
        let addr = NodeAddr::from_octets([10, 0, 0, 42]);
        assert_eq!(addr.suffix(), 42);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<NodeAddr>().is_err());
        assert!("127.0.0".parse::<NodeAddr>().is_err());
        assert!("127.0.0.1.5".parse::<NodeAddr>().is_err());
        assert!("127.0.0.256".parse::<NodeAddr>().is_err());
        assert!("127.0.x.1".parse::<NodeAddr>().is_err());
    }

    #[test]
    fn test_ipv4_conversion() {
        let addr = NodeAddr::from_octets([192, 168, 1, 7]);
        let ip: Ipv4Addr = addr.into();
        assert_eq!(ip, Ipv4Addr::new(192, 168, 1, 7));
        assert_eq!(NodeAddr::from(ip), addr);
    }
}
