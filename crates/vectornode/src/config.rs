//! Topology configuration loader
//!
//! The configuration file describes every node in the simulated network as
//! a block separated by blank lines: the node's own address on the first
//! line, then one `neighbor-address link-cost` pair per line. A process
//! resolves its own block by the address it was started with; the neighbor
//! set is fixed for the process lifetime.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use vectormesh_protocol::NodeAddr;

/// One node's view of the topology: its own address and the directly
/// linked neighbors with their costs.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub address: NodeAddr,
    pub neighbors: Vec<(NodeAddr, u8)>,
}

impl NodeConfig {
    /// Load the configuration file and resolve the block for `address`.
    ///
    /// Any failure here is fatal at startup; the event loop never starts
    /// with a partial topology.
    pub fn load(path: &Path, address: NodeAddr) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration file {}", path.display()))?;

        Self::parse(&contents, address)
            .with_context(|| format!("malformed configuration file {}", path.display()))
    }

    /// Parse the blank-line-separated block format
    pub fn parse(contents: &str, address: NodeAddr) -> Result<Self> {
        for block in contents.split("\n\n") {
            let mut lines = block.lines().map(str::trim).filter(|line| !line.is_empty());

            let Some(first) = lines.next() else {
                continue;
            };
            let block_address: NodeAddr = first
                .parse()
                .with_context(|| format!("invalid node address {first:?}"))?;

            let mut neighbors = Vec::new();
            for line in lines {
                let mut fields = line.split_whitespace();
                let (Some(neighbor), Some(cost), None) =
                    (fields.next(), fields.next(), fields.next())
                else {
                    bail!("expected \"neighbor-address cost\", got {line:?}");
                };

                let neighbor: NodeAddr = neighbor
                    .parse()
                    .with_context(|| format!("invalid neighbor address {neighbor:?}"))?;
                let cost: u8 = cost
                    .parse()
                    .with_context(|| format!("invalid link cost {cost:?} (must be 0-255)"))?;

                neighbors.push((neighbor, cost));
            }

            if block_address == address {
                return Ok(NodeConfig { address, neighbors });
            }
        }

        bail!("no configuration block for node {address}");
    }
}
