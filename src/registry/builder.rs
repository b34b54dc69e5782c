//! Registry builder - the building phase.
//!
//! Every registration is validated immediately, in this order:
//! 1. code 0-99 is reserved
//! 2. the code must lie in the kind's family block (when enforced)
//! 3. the code must not be claimed (first registration wins)
//! 4. the kind must not already own a code
//!
//! A rejected registration leaves the builder unchanged, so callers can
//! report the error and keep going or abort startup.
//!
//! # Example
//!
//! ```
//! use protocol_registry::message::{Heartbeat, Message, UdpHelloRequest};
//! use protocol_registry::registry::RegistryBuilder;
//!
//! let mut builder = RegistryBuilder::new();
//! builder
//!     .register::<Message>(100)?
//!     .register::<Heartbeat>(102)?
//!     .register::<UdpHelloRequest>(1200)?;
//! let registry = builder.build();
//!
//! assert_eq!(registry.len(), 3);
//! # Ok::<(), protocol_registry::RegistryError>(())
//! ```

use std::any::TypeId;
use std::collections::HashMap;

use super::family::is_reserved;
use super::ProtocolRegistry;
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::message::{Protocol, ProtocolKind};

/// Collects registrations until [`build`](RegistryBuilder::build) freezes them.
pub struct RegistryBuilder {
    /// Prototypes by code.
    by_code: HashMap<u16, Box<dyn Protocol>>,
    /// Code by concrete kind.
    by_kind: HashMap<TypeId, u16>,
    config: RegistryConfig,
}

impl RegistryBuilder {
    /// Create an empty builder with the default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            by_code: HashMap::new(),
            by_kind: HashMap::new(),
            config,
        }
    }

    /// Register kind `T` under `code`, using `T::default()` as prototype.
    pub fn register<T: ProtocolKind>(&mut self, code: u16) -> Result<&mut Self> {
        self.register_prototype(code, Box::new(T::default()))
    }

    /// Register an already-boxed prototype under `code`.
    ///
    /// The prototype should be zero-valued; it is only ever used as a
    /// template for [`Protocol::new_instance`].
    pub fn register_prototype(
        &mut self,
        code: u16,
        prototype: Box<dyn Protocol>,
    ) -> Result<&mut Self> {
        let name = prototype.name();
        let family = prototype.family();

        if is_reserved(code) {
            return Err(RegistryError::ReservedCode(code));
        }

        if self.config.enforce_families && !family.contains(code) {
            return Err(RegistryError::CodeOutsideFamily { code, name, family });
        }

        if let Some(existing) = self.by_code.get(&code) {
            return Err(RegistryError::DuplicateCode {
                code,
                existing: existing.name(),
                attempted: name,
            });
        }

        let kind = prototype.kind_id();
        if let Some(&owned) = self.by_kind.get(&kind) {
            return Err(RegistryError::DuplicateType { name, code: owned });
        }

        tracing::debug!("Registered protocol {} ({}) under code {}", name, family, code);
        self.by_kind.insert(kind, code);
        self.by_code.insert(code, prototype);
        Ok(self)
    }

    /// Check if a code is already claimed.
    pub fn contains(&self, code: u16) -> bool {
        self.by_code.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Freeze the table. The result has no mutating methods.
    pub fn build(self) -> ProtocolRegistry {
        tracing::info!("Protocol registry built with {} entries", self.by_code.len());
        ProtocolRegistry::from_parts(self.by_code, self.by_kind, self.config)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        GatewayToProviderRequest, Heartbeat, Message, Ping, Pong, UdpHelloRequest,
    };
    use crate::registry::CodeFamily;

    #[test]
    fn test_register_sequence() {
        let mut builder = RegistryBuilder::new();
        builder
            .register::<Message>(100)
            .unwrap()
            .register::<Heartbeat>(102)
            .unwrap();

        assert!(builder.contains(100));
        assert!(builder.contains(102));
        assert!(!builder.contains(101));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_duplicate_code_keeps_first() {
        let mut builder = RegistryBuilder::new();
        builder.register::<Ping>(103).unwrap();

        let err = builder.register::<Pong>(103).err().unwrap();
        assert!(matches!(
            err,
            RegistryError::DuplicateCode {
                code: 103,
                existing: "Ping",
                attempted: "Pong"
            }
        ));

        let registry = builder.build();
        assert!(registry.lookup(103).unwrap().is::<Ping>());
        // Pong was never inserted, not even under another key
        assert!(registry.reverse_lookup::<Pong>().is_err());
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.register::<Ping>(103).unwrap();

        let err = builder.register::<Ping>(104).err().unwrap();
        assert!(matches!(
            err,
            RegistryError::DuplicateType {
                name: "Ping",
                code: 103
            }
        ));
        assert!(!builder.contains(104));
    }

    #[test]
    fn test_reserved_code_rejected() {
        let mut builder = RegistryBuilder::new();
        let err = builder.register::<Ping>(0).err().unwrap();
        assert!(matches!(err, RegistryError::ReservedCode(0)));

        let err = builder.register::<Ping>(99).err().unwrap();
        assert!(matches!(err, RegistryError::ReservedCode(99)));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_family_enforced() {
        let mut builder = RegistryBuilder::new();

        let err = builder.register::<UdpHelloRequest>(150).err().unwrap();
        assert!(matches!(
            err,
            RegistryError::CodeOutsideFamily {
                code: 150,
                name: "UdpHelloRequest",
                family: CodeFamily::Handshake
            }
        ));

        let err = builder.register::<Heartbeat>(5002).err().unwrap();
        assert!(matches!(err, RegistryError::CodeOutsideFamily { .. }));

        assert!(builder.register::<GatewayToProviderRequest>(5000).is_ok());
    }

    #[test]
    fn test_family_enforcement_can_be_disabled() {
        let config = RegistryConfig::default().enforce_families(false);
        let mut builder = RegistryBuilder::with_config(config);

        assert!(builder.register::<UdpHelloRequest>(150).is_ok());
        // Reserved codes stay reserved
        assert!(builder.register::<Heartbeat>(10).is_err());
    }

    #[test]
    fn test_register_boxed_prototype() {
        let mut builder = RegistryBuilder::new();
        let prototype: Box<dyn Protocol> = Box::new(Pong::default());
        builder.register_prototype(104, prototype).unwrap();

        let registry = builder.build();
        assert_eq!(registry.reverse_lookup::<Pong>().unwrap(), 104);
    }
}
