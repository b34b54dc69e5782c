//! Protocol module - code-prefixed packets.
//!
//! - 2-byte big-endian code prefix encoding/decoding
//! - [`Packet`] with the raw body
//! - [`encode_packet`] / [`decode_packet`], the encode and decode paths
//!   backed by a [`ProtocolRegistry`](crate::registry::ProtocolRegistry)

mod packet;
mod wire_format;

pub use packet::{decode_packet, decode_parsed, encode_packet, Packet};
pub use wire_format::{decode_code, encode_code, validate_code, CODE_SIZE};
