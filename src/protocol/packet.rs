//! Packet struct and the registry-backed encode/decode paths.
//!
//! Uses `bytes::Bytes` so the body can be shared without copying.
//!
//! # Example
//!
//! ```
//! use protocol_registry::message::Pong;
//! use protocol_registry::protocol::{decode_packet, encode_packet};
//! use protocol_registry::standard::standard_registry;
//!
//! let registry = standard_registry().unwrap();
//! let bytes = encode_packet(&registry, &Pong { time: 7 }).unwrap();
//! assert_eq!(&bytes[..2], &[0x00, 0x68]); // 104
//!
//! let message = decode_packet(&registry, &bytes).unwrap();
//! assert_eq!(message.downcast_ref::<Pong>(), Some(&Pong { time: 7 }));
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{decode_code, validate_code, CODE_SIZE};
use crate::error::{RegistryError, Result};
use crate::message::Protocol;
use crate::registry::ProtocolRegistry;

/// A code-prefixed packet, body not yet decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Protocol code.
    pub code: u16,
    /// Body bytes (zero-copy via `bytes::Bytes`).
    pub body: Bytes,
}

impl Packet {
    pub fn new(code: u16, body: Bytes) -> Self {
        Self { code, body }
    }

    /// Split raw packet bytes into code and body.
    ///
    /// # Errors
    ///
    /// - `Protocol` if the buffer is shorter than the code prefix or the body
    ///   exceeds `max_body_size`
    /// - `ReservedCode` if the code is in the reserved block
    pub fn parse(mut bytes: Bytes, max_body_size: usize) -> Result<Self> {
        let code = decode_code(&bytes).ok_or_else(|| {
            RegistryError::Protocol(format!(
                "Packet of {} bytes is shorter than the code prefix",
                bytes.len()
            ))
        })?;
        validate_code(code)?;

        let body = bytes.split_off(CODE_SIZE);
        if body.len() > max_body_size {
            return Err(RegistryError::Protocol(format!(
                "Body size {} exceeds maximum {}",
                body.len(),
                max_body_size
            )));
        }

        Ok(Self { code, body })
    }

    /// Get a reference to the body bytes.
    #[inline]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Encode code prefix and body into one contiguous buffer.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(CODE_SIZE + self.body.len());
        buf.put_u16(self.code);
        buf.put_slice(&self.body);
        buf.freeze()
    }
}

/// Encode path: write the registered code, then the body.
///
/// # Errors
///
/// - `UnregisteredType` if the message's kind has no code. That is a
///   programming error and should have been caught by the startup self-check.
/// - `Protocol` if the body exceeds the registry's `max_body_size`
pub fn encode_packet(registry: &ProtocolRegistry, message: &dyn Protocol) -> Result<Bytes> {
    let code = registry.code_of(message)?;

    let mut buf = BytesMut::with_capacity(64);
    buf.put_u16(code);
    message.encode_into(&mut buf)?;

    let body_len = buf.len() - CODE_SIZE;
    let max = registry.config().max_body_size;
    if body_len > max {
        return Err(RegistryError::Protocol(format!(
            "Body size {} exceeds maximum {}",
            body_len, max
        )));
    }
    Ok(buf.freeze())
}

/// Decode path: read the code, materialize a fresh message, fill it.
///
/// # Errors
///
/// `UnknownCode` for codes this side does not know. Callers should drop the
/// packet and keep the connection (see [`RegistryError::is_recoverable`]).
pub fn decode_packet(registry: &ProtocolRegistry, bytes: &[u8]) -> Result<Box<dyn Protocol>> {
    let code = decode_code(bytes).ok_or_else(|| {
        RegistryError::Protocol(format!(
            "Packet of {} bytes is shorter than the code prefix",
            bytes.len()
        ))
    })?;
    validate_code(code)?;

    let body = &bytes[CODE_SIZE..];
    let max = registry.config().max_body_size;
    if body.len() > max {
        return Err(RegistryError::Protocol(format!(
            "Body size {} exceeds maximum {}",
            body.len(),
            max
        )));
    }

    registry.decode(code, body)
}

/// Decode an already parsed packet.
pub fn decode_parsed(registry: &ProtocolRegistry, packet: &Packet) -> Result<Box<dyn Protocol>> {
    registry.decode(packet.code, packet.body())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::message::{Error, Heartbeat, Message, Pong, UdpHelloRequest};
    use crate::registry::RegistryBuilder;

    fn registry_with(config: RegistryConfig) -> ProtocolRegistry {
        let mut builder = RegistryBuilder::with_config(config);
        builder
            .register::<Message>(100)
            .unwrap()
            .register::<Heartbeat>(102)
            .unwrap()
            .register::<UdpHelloRequest>(1200)
            .unwrap();
        builder.build()
    }

    fn registry() -> ProtocolRegistry {
        registry_with(RegistryConfig::default())
    }

    #[test]
    fn test_encode_writes_code_prefix() {
        let registry = registry();
        let bytes = encode_packet(&registry, &Heartbeat::default()).unwrap();

        assert_eq!(&bytes[..], &[0x00, 0x66, 0x80]);
    }

    #[test]
    fn test_decode_packet() {
        let registry = registry();
        let hello = UdpHelloRequest {
            message: "Hello, this is the udp client!".to_string(),
        };
        let bytes = encode_packet(&registry, &hello).unwrap();

        let decoded = decode_packet(&registry, &bytes).unwrap();
        assert_eq!(decoded.downcast_ref::<UdpHelloRequest>(), Some(&hello));
    }

    #[test]
    fn test_encode_unregistered_type() {
        let registry = registry();
        let err = encode_packet(&registry, &Pong { time: 1 }).err().unwrap();
        assert!(matches!(err, RegistryError::UnregisteredType("Pong")));
    }

    #[test]
    fn test_decode_unknown_code_is_recoverable() {
        let registry = registry();
        let mut bytes = vec![0x27, 0x0F]; // 9999
        bytes.push(0x80);

        let err = decode_packet(&registry, &bytes).err().unwrap();
        assert!(matches!(err, RegistryError::UnknownCode(9999)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_decode_too_short() {
        let registry = registry();
        let err = decode_packet(&registry, &[0x00]).err().unwrap();
        assert!(matches!(err, RegistryError::Protocol(_)));
    }

    #[test]
    fn test_decode_reserved_code() {
        let registry = registry();
        let err = decode_packet(&registry, &[0x00, 0x00, 0x80]).err().unwrap();
        assert!(matches!(err, RegistryError::ReservedCode(0)));
    }

    #[test]
    fn test_decode_body_too_large() {
        let strict = registry_with(RegistryConfig::default().max_body_size(4));
        let message = Message {
            module: 1,
            code: 1,
            message: "longer than four bytes".to_string(),
        };
        let bytes = encode_packet(&registry(), &message).unwrap();

        let err = decode_packet(&strict, &bytes).err().unwrap();
        assert!(err.to_string().contains("exceeds maximum"));
    }

    #[test]
    fn test_encode_body_too_large() {
        let strict = registry_with(RegistryConfig::default().max_body_size(4));
        let message = Message {
            module: 1,
            code: 1,
            message: "longer than four bytes".to_string(),
        };

        let err = encode_packet(&strict, &message).err().unwrap();
        assert!(matches!(err, RegistryError::Protocol(_)));
        assert!(err.to_string().contains("exceeds maximum 4"));

        // Heartbeat's body is a single byte
        assert!(encode_packet(&strict, &Heartbeat::default()).is_ok());
    }

    #[test]
    fn test_decode_garbage_body() {
        let registry = registry();
        let err = decode_packet(&registry, &[0x00, 0x64, 0xc1]).err().unwrap();
        assert!(matches!(err, RegistryError::MsgPackDecode(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_decode_rejects_trailing_garbage() {
        let registry = registry();
        let mut bytes = encode_packet(&registry, &Heartbeat::default())
            .unwrap()
            .to_vec();
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);

        let err = decode_packet(&registry, &bytes).err().unwrap();
        assert!(matches!(err, RegistryError::Protocol(_)));
        assert!(err.to_string().contains("4 trailing bytes after body"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_packet_parse() {
        let bytes = Bytes::from_static(&[0x04, 0xB0, 0x81, 0xA1, 0x61, 0x01]);
        let packet = Packet::parse(bytes.clone(), 1024).unwrap();

        assert_eq!(packet.code, 1200);
        assert_eq!(packet.body(), &[0x81, 0xA1, 0x61, 0x01]);
        assert_eq!(packet.to_bytes(), bytes);
    }

    #[test]
    fn test_packet_parse_errors() {
        assert!(Packet::parse(Bytes::from_static(&[0x01]), 1024).is_err());
        assert!(Packet::parse(Bytes::from_static(&[0x00, 0x05]), 1024).is_err());
        assert!(Packet::parse(Bytes::from_static(&[0x00, 0x64, 1, 2, 3]), 2).is_err());
    }

    #[test]
    fn test_parsed_packet_decodes() {
        let registry = registry();
        let error = Error {
            module: 4,
            error_code: 500,
            error_message: "boom".to_string(),
        };
        let mut builder = registry.to_builder().unwrap();
        builder.register::<Error>(101).unwrap();
        let registry = builder.build();

        let bytes = encode_packet(&registry, &error).unwrap();
        let packet = Packet::parse(bytes, 1024).unwrap();
        assert_eq!(packet.code, 101);

        let decoded = decode_parsed(&registry, &packet).unwrap();
        assert_eq!(decoded.downcast_ref::<Error>(), Some(&error));
    }
}
