//! Error types for protocol operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid node address: {0}")]
    InvalidAddress(String),

    #[error("Unexpected message tag: {0:#04x}")]
    UnexpectedTag(u8),

    #[error("Message truncated: {len} bytes (need at least {need})")]
    Truncated { len: usize, need: usize },

    #[error("Hello payload is not valid UTF-8")]
    InvalidPayload,
}
