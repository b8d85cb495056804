use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use vectormesh_protocol::NodeAddr;
use vectornode::config::NodeConfig;
use vectornode::engine::PortMap;
use vectornode::node::Node;

/// Distance-vector routing daemon: one process per simulated network node
#[derive(Parser, Debug)]
#[command(name = "vectornode", version, about)]
struct Cli {
    /// Topology configuration file
    config: PathBuf,

    /// This node's address in the topology
    #[arg(long)]
    address: NodeAddr,

    /// Base listening port; a node listens on base + its address suffix
    #[arg(long, default_value_t = PortMap::DEFAULT_BASE_PORT)]
    base_port: u16,

    /// Seed for the traffic-generation randomness (entropy if omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = NodeConfig::load(&cli.config, cli.address)?;
    let ports = PortMap::new(cli.base_port);
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut node = Node::bind(config, ports, rng).await?;
    node.run().await
}
