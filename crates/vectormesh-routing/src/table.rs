//! Routing table and relaxation
//!
//! The table is owned by exactly one event loop and mutated sequentially,
//! so no locking is involved. Entries only ever improve or persist; there
//! is no expiry of stale routes (a vanished neighbor is not detected).

use indexmap::IndexMap;
use vectormesh_protocol::NodeAddr;

use crate::error::{Result, RoutingError};

/// Largest representable cost (one unsigned byte on the wire).
/// Cost arithmetic saturates here instead of wrapping.
pub const MAX_COST: u8 = u8::MAX;

/// One routing entry: the cost to reach a destination and the neighbor
/// traffic for it is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub cost: u8,
    pub next_hop: NodeAddr,
}

/// The mutable map of destination -> (cost, next hop) for one node.
///
/// Iteration follows insertion order; receivers of encoded advertisements
/// must not rely on it.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    own_addr: NodeAddr,
    routes: IndexMap<NodeAddr, Route>,
}

impl RoutingTable {
    /// Create an empty table for the given node
    pub fn new(own_addr: NodeAddr) -> Self {
        RoutingTable {
            own_addr,
            routes: IndexMap::new(),
        }
    }

    /// Create a table seeded with the configured direct neighbors: each
    /// neighbor is reachable at its link cost with itself as next hop.
    pub fn with_neighbors<I>(own_addr: NodeAddr, neighbors: I) -> Self
    where
        I: IntoIterator<Item = (NodeAddr, u8)>,
    {
        let mut table = Self::new(own_addr);
        for (neighbor, cost) in neighbors {
            table.routes.insert(
                neighbor,
                Route {
                    cost,
                    next_hop: neighbor,
                },
            );
        }
        table
    }

    /// The address of the node owning this table
    pub fn own_addr(&self) -> NodeAddr {
        self.own_addr
    }

    /// Look up the entry for a destination
    pub fn route(&self, destination: &NodeAddr) -> Option<Route> {
        self.routes.get(destination).copied()
    }

    /// Resolve the neighbor to forward traffic for `destination` to
    pub fn next_hop(&self, destination: &NodeAddr) -> Result<NodeAddr> {
        self.routes
            .get(destination)
            .map(|route| route.next_hop)
            .ok_or(RoutingError::UnreachableDestination(*destination))
    }

    /// All known destinations, in table order
    pub fn destinations(&self) -> impl Iterator<Item = NodeAddr> + '_ {
        self.routes.keys().copied()
    }

    /// (destination, cost) pairs in table order, ready for an Update
    /// advertisement
    pub fn entries(&self) -> impl Iterator<Item = (NodeAddr, u8)> + '_ {
        self.routes.iter().map(|(dest, route)| (*dest, route.cost))
    }

    /// Iterate over (destination, route) pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&NodeAddr, &Route)> {
        self.routes.iter()
    }

    /// Number of known destinations
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table knows no destinations
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Relax this table against an advertisement received from `sender`.
    ///
    /// Each advertised (cost, destination) pair is considered as a path
    /// through the sender: candidate cost = advertised cost + cost to reach
    /// the sender, saturating at [`MAX_COST`]. An existing entry is replaced
    /// only on strict improvement (ties are never adopted, which prevents
    /// route flapping on equal-cost advertisements). Unknown destinations
    /// are inserted unless they name this node itself.
    ///
    /// An advertisement from a sender this table has no entry for is
    /// rejected; accepting it would require guessing the cost to the sender.
    ///
    /// Returns whether any entry changed, which callers use to trigger an
    /// immediate re-advertisement.
    pub fn apply_update(&mut self, sender: NodeAddr, entries: &[(u8, NodeAddr)]) -> Result<bool> {
        let cost_to_sender = self
            .routes
            .get(&sender)
            .map(|route| route.cost)
            .ok_or(RoutingError::UnknownSender(sender))?;

        let mut changed = false;
        for &(cost, destination) in entries {
            if destination == self.own_addr {
                continue;
            }

            let candidate = cost.saturating_add(cost_to_sender);
            match self.routes.get_mut(&destination) {
                Some(route) => {
                    if candidate < route.cost {
                        *route = Route {
                            cost: candidate,
                            next_hop: sender,
                        };
                        changed = true;
                    }
                }
                None => {
                    self.routes.insert(
                        destination,
                        Route {
                            cost: candidate,
                            next_hop: sender,
                        },
                    );
                    changed = true;
                }
            }
        }

        Ok(changed)
    }
}
