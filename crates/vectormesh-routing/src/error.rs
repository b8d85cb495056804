//! Routing error types

use thiserror::Error;
use vectormesh_protocol::NodeAddr;

/// Routing-specific errors
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("Update from unknown sender: {0}")]
    UnknownSender(NodeAddr),

    #[error("No route to destination: {0}")]
    UnreachableDestination(NodeAddr),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;
