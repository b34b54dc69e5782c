//! # protocol-registry
//!
//! Code-to-message registry for the transport boundary of a request/response
//! system.
//!
//! Every packet on the wire starts with a small integer code. This crate
//! owns the table that gives those codes meaning:
//!
//! - **Decode path**: code → prototype → fresh message filled from the body
//! - **Encode path**: concrete message → code → code-prefixed packet
//!
//! The table is built once at startup, self-checked, and then read
//! concurrently without locks.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use protocol_registry::message::Heartbeat;
//! use protocol_registry::protocol::{decode_packet, encode_packet};
//! use protocol_registry::standard::standard_registry;
//!
//! let registry = Arc::new(standard_registry().unwrap());
//!
//! let bytes = encode_packet(&registry, &Heartbeat::default()).unwrap();
//! let message = decode_packet(&registry, &bytes).unwrap();
//! assert!(message.is::<Heartbeat>());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod protocol;
pub mod registry;
pub mod standard;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use handler::{PacketContext, PacketRouter};
pub use message::{Protocol, ProtocolKind};
pub use registry::{ProtocolRegistry, RegistryBuilder, SharedRegistry};
