//! Message kinds and their wire codec
//!
//! Both message kinds share one datagram stream and are disambiguated by a
//! one-byte type tag in the first byte. All fields are unsigned with no
//! padding; addresses are exactly 4 bytes in segment order.
//!
//! Update (tag 0x00):
//! - Byte 0: type tag
//! - Then per routing entry: 4 address bytes + 1 cost byte
//!
//! Hello (tag 0x01):
//! - Byte 0: type tag
//! - Bytes 1-4: source address
//! - Bytes 5-8: destination address
//! - Bytes 9..: UTF-8 payload, no length prefix (the datagram boundary
//!   delimits it — valid only over a datagram transport)

use serde::{Deserialize, Serialize};

use crate::error::{ProtocolError, Result};
use crate::types::NodeAddr;

/// Type tag for routing-table Update messages
pub const UPDATE_TAG: u8 = 0x00;

/// Type tag for Hello messages
pub const HELLO_TAG: u8 = 0x01;

/// Wire size of one Update entry (4 address bytes + 1 cost byte)
pub const ENTRY_SIZE: usize = 5;

/// Fixed Hello prefix: tag + source address + destination address
pub const HELLO_HEADER_SIZE: usize = 9;

/// The two recognized message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    Update,
    Hello,
}

impl MessageKind {
    /// Identify a message by its type tag; unknown tags are not an error,
    /// the caller drops those datagrams.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            UPDATE_TAG => Some(MessageKind::Update),
            HELLO_TAG => Some(MessageKind::Hello),
            _ => None,
        }
    }

    /// The wire tag for this kind
    pub fn tag(&self) -> u8 {
        match self {
            MessageKind::Update => UPDATE_TAG,
            MessageKind::Hello => HELLO_TAG,
        }
    }
}

/// An application message forwarded hop-by-hop toward its destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hello {
    /// Originating node
    pub source: NodeAddr,

    /// Final destination
    pub destination: NodeAddr,

    /// Message text
    pub text: String,
}

/// Serialize a full routing table into an Update message.
///
/// Entries are written in the order the iterator yields them; receivers
/// must not assume any ordering.
pub fn encode_update<I>(entries: I) -> Vec<u8>
where
    I: IntoIterator<Item = (NodeAddr, u8)>,
{
    let mut msg = vec![UPDATE_TAG];

    for (destination, cost) in entries {
        msg.extend_from_slice(destination.as_bytes());
        msg.push(cost);
    }

    msg
}

/// Parse an Update message into its (cost, destination) pairs.
///
/// Trailing bytes that do not form a whole entry (1-4 leftover) are
/// silently ignored.
pub fn decode_update(bytes: &[u8]) -> Result<Vec<(u8, NodeAddr)>> {
    let tag = *bytes.first().ok_or(ProtocolError::Truncated {
        len: bytes.len(),
        need: 1,
    })?;
    if tag != UPDATE_TAG {
        return Err(ProtocolError::UnexpectedTag(tag));
    }

    let entries = bytes[1..]
        .chunks_exact(ENTRY_SIZE)
        .map(|entry| {
            let destination = NodeAddr::from_octets([entry[0], entry[1], entry[2], entry[3]]);
            (entry[4], destination)
        })
        .collect();

    Ok(entries)
}

/// Serialize a Hello message
pub fn encode_hello(text: &str, source: NodeAddr, destination: NodeAddr) -> Vec<u8> {
    let mut msg = Vec::with_capacity(HELLO_HEADER_SIZE + text.len());
    msg.push(HELLO_TAG);
    msg.extend_from_slice(source.as_bytes());
    msg.extend_from_slice(destination.as_bytes());
    msg.extend_from_slice(text.as_bytes());
    msg
}

/// Parse a Hello message
pub fn decode_hello(bytes: &[u8]) -> Result<Hello> {
    if bytes.len() < HELLO_HEADER_SIZE {
        return Err(ProtocolError::Truncated {
            len: bytes.len(),
            need: HELLO_HEADER_SIZE,
        });
    }
    if bytes[0] != HELLO_TAG {
        return Err(ProtocolError::UnexpectedTag(bytes[0]));
    }

    let source = NodeAddr::from_octets([bytes[1], bytes[2], bytes[3], bytes[4]]);
    let destination = NodeAddr::from_octets([bytes[5], bytes[6], bytes[7], bytes[8]]);
    let text = std::str::from_utf8(&bytes[HELLO_HEADER_SIZE..])
        .map_err(|_| ProtocolError::InvalidPayload)?
        .to_owned();

    Ok(Hello {
        source,
        destination,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn addr(s: &str) -> NodeAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_update_layout() {
        let msg = encode_update(vec![(addr("127.0.0.1"), 10), (addr("127.0.0.2"), 5)]);
        assert_eq!(
            msg,
            vec![0x00, 0x7F, 0x00, 0x00, 0x01, 0x0A, 0x7F, 0x00, 0x00, 0x02, 0x05]
        );
    }

    #[test]
    fn test_update_round_trip() {
        let entries = vec![
            (addr("10.0.0.1"), 0),
            (addr("10.0.0.2"), 255),
            (addr("192.168.1.9"), 42),
        ];

        let decoded = decode_update(&encode_update(entries.clone())).unwrap();

        let sent: HashSet<_> = entries.into_iter().collect();
        let received: HashSet<_> = decoded.into_iter().map(|(cost, dest)| (dest, cost)).collect();
        assert_eq!(sent, received);
    }

    #[test]
    fn test_empty_update() {
        let msg = encode_update(std::iter::empty());
        assert_eq!(msg, vec![UPDATE_TAG]);
        assert!(decode_update(&msg).unwrap().is_empty());
    }

    #[test]
    fn test_update_ignores_trailing_bytes() {
        let mut msg = encode_update(vec![(addr("10.0.0.1"), 3)]);
        msg.extend_from_slice(&[0xDE, 0xAD, 0xBE]);

        let decoded = decode_update(&msg).unwrap();
        assert_eq!(decoded, vec![(3, addr("10.0.0.1"))]);
    }

    #[test]
    fn test_update_rejects_wrong_tag() {
        assert_eq!(
            decode_update(&[HELLO_TAG]),
            Err(ProtocolError::UnexpectedTag(HELLO_TAG))
        );
        assert!(matches!(
            decode_update(&[]),
            Err(ProtocolError::Truncated { .. })
        ));
    }

    #[test]
    fn test_hello_round_trip() {
        let msg = encode_hello("Bionic Beaver", addr("127.0.0.1"), addr("127.0.0.4"));
        let hello = decode_hello(&msg).unwrap();

        assert_eq!(hello.source, addr("127.0.0.1"));
        assert_eq!(hello.destination, addr("127.0.0.4"));
        assert_eq!(hello.text, "Bionic Beaver");
    }

    #[test]
    fn test_hello_multibyte_text() {
        let msg = encode_hello("héllo ✓", addr("10.0.0.1"), addr("10.0.0.2"));
        assert_eq!(decode_hello(&msg).unwrap().text, "héllo ✓");
    }

    #[test]
    fn test_hello_empty_payload() {
        let msg = encode_hello("", addr("10.0.0.1"), addr("10.0.0.2"));
        assert_eq!(msg.len(), HELLO_HEADER_SIZE);
        assert_eq!(decode_hello(&msg).unwrap().text, "");
    }

    #[test]
    fn test_hello_truncated() {
        let msg = encode_hello("hi", addr("10.0.0.1"), addr("10.0.0.2"));
        assert_eq!(
            decode_hello(&msg[..7]),
            Err(ProtocolError::Truncated { len: 7, need: 9 })
        );
    }

    #[test]
    fn test_hello_invalid_utf8() {
        let mut msg = encode_hello("", addr("10.0.0.1"), addr("10.0.0.2"));
        msg.extend_from_slice(&[0xFF, 0xFE]);
        assert_eq!(decode_hello(&msg), Err(ProtocolError::InvalidPayload));
    }

    #[test]
    fn test_message_kind_tags() {
        assert_eq!(MessageKind::from_tag(0x00), Some(MessageKind::Update));
        assert_eq!(MessageKind::from_tag(0x01), Some(MessageKind::Hello));
        assert_eq!(MessageKind::from_tag(0x02), None);
        assert_eq!(MessageKind::Update.tag(), UPDATE_TAG);
        assert_eq!(MessageKind::Hello.tag(), HELLO_TAG);
    }
}
