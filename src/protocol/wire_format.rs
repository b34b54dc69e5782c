//! Wire format of the code prefix.
//!
//! Every packet starts with its protocol code:
//! ```text
//! ┌──────────┬──────────────────────────┐
//! │ Code     │ Body                     │
//! │ 2 bytes  │ MsgPack map, rest of the │
//! │ uint16 BE│ packet                   │
//! └──────────┴──────────────────────────┘
//! ```
//!
//! Packet boundaries are the transport's business; this layout assumes the
//! caller hands over exactly one packet.

use crate::error::{RegistryError, Result};
use crate::registry::is_reserved;

/// Code prefix size in bytes (fixed, exactly 2).
pub const CODE_SIZE: usize = 2;

/// Encode a code prefix (Big Endian).
#[inline]
pub fn encode_code(code: u16) -> [u8; CODE_SIZE] {
    code.to_be_bytes()
}

/// Decode a code prefix (Big Endian).
///
/// Returns `None` if buffer is too short.
///
/// # Example
///
/// ```
/// use protocol_registry::protocol::decode_code;
///
/// assert_eq!(decode_code(&[0x04, 0xB0, 0x80]), Some(1200));
/// assert_eq!(decode_code(&[0x04]), None);
/// ```
#[inline]
pub fn decode_code(buf: &[u8]) -> Option<u16> {
    if buf.len() < CODE_SIZE {
        return None;
    }
    Some(u16::from_be_bytes([buf[0], buf[1]]))
}

/// Validate a code read from the wire.
///
/// Reserved codes are never assigned, so a packet carrying one is malformed
/// rather than merely unknown.
pub fn validate_code(code: u16) -> Result<()> {
    if is_reserved(code) {
        return Err(RegistryError::ReservedCode(code));
    }
    Ok(())
}
