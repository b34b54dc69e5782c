//! Registry module - the code ↔ message-kind table.
//!
//! Provides:
//! - [`RegistryBuilder`] - the building phase, validates every registration
//! - [`ProtocolRegistry`] - the frozen, lock-free serving phase
//! - [`CodeFamily`] - the enforced numeric blocks of the code space
//! - [`SharedRegistry`] - snapshot-and-swap registration after startup
//! - [`Manifest`] - the table in serializable form, for peer checks
//!
//! # Example
//!
//! ```
//! use protocol_registry::message::{Heartbeat, Message, UdpHelloRequest};
//! use protocol_registry::registry::ProtocolRegistry;
//! use protocol_registry::RegistryError;
//!
//! let mut builder = ProtocolRegistry::builder();
//! builder
//!     .register::<Message>(100)?
//!     .register::<Heartbeat>(102)?
//!     .register::<UdpHelloRequest>(1200)?;
//! let registry = builder.build();
//!
//! assert!(registry.lookup(102)?.is::<Heartbeat>());
//! assert_eq!(registry.reverse_lookup::<UdpHelloRequest>()?, 1200);
//! assert!(matches!(registry.lookup(999), Err(RegistryError::UnknownCode(999))));
//! # Ok::<(), RegistryError>(())
//! ```

mod builder;
mod family;
mod manifest;
mod shared;
mod table;

pub use builder::RegistryBuilder;
pub use family::{is_reserved, CodeFamily, MAX_RESERVED_CODE};
pub use manifest::{Manifest, ManifestEntry, ManifestMismatch, PROTOCOL_VERSION};
pub use shared::SharedRegistry;
pub use table::{ProtocolRegistry, RegistryEntry};
