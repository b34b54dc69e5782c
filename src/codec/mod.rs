//! Codec module - body serialization for registered protocols.
//!
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (struct-as-map)
//!
//! # Design
//!
//! The codec is a marker struct with static methods. Every
//! [`ProtocolKind`](crate::message::ProtocolKind) routes its `encode` and
//! `decode` capability through it, so all peers agree on one body format.
//!
//! # Example
//!
//! ```
//! use protocol_registry::codec::MsgPackCodec;
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod msgpack;

pub use msgpack::MsgPackCodec;
