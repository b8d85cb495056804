//! VectorMesh Protocol Module
//!
//! This module defines the wire-level message formats exchanged between
//! distance-vector nodes:
//! - Routing-table Update messages (full-table advertisements)
//! - Hello messages (application payloads forwarded hop-by-hop)

pub mod error;
pub mod message;
pub mod types;

pub use error::{ProtocolError, Result};
pub use message::{decode_hello, decode_update, encode_hello, encode_update, Hello, MessageKind};
pub use types::NodeAddr;
