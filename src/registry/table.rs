//! The serving-phase registry.
//!
//! A [`ProtocolRegistry`] only exists once a [`RegistryBuilder`] has been
//! frozen, so no consumer can observe a partially populated table. It has no
//! interior mutability and is shared across connection tasks as
//! `Arc<ProtocolRegistry>` without locking.

use std::any::TypeId;
use std::collections::HashMap;

use super::{CodeFamily, Manifest, RegistryBuilder};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::message::{KindId, Protocol, ProtocolKind};

/// One row of the table, for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub code: u16,
    pub name: &'static str,
    pub family: CodeFamily,
}

/// Immutable code ↔ message-kind table.
pub struct ProtocolRegistry {
    /// Prototypes by code.
    by_code: HashMap<u16, Box<dyn Protocol>>,
    /// Code by concrete kind (encode path).
    by_kind: HashMap<TypeId, u16>,
    config: RegistryConfig,
}

impl ProtocolRegistry {
    /// Start a new table.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(super) fn from_parts(
        by_code: HashMap<u16, Box<dyn Protocol>>,
        by_kind: HashMap<TypeId, u16>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            by_code,
            by_kind,
            config,
        }
    }

    /// Get the prototype registered under `code`.
    ///
    /// Returns the same prototype on every call.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownCode`] if nothing is registered. This is
    /// expected during rolling upgrades; drop the packet, keep the connection.
    pub fn lookup(&self, code: u16) -> Result<&dyn Protocol> {
        self.get(code).ok_or(RegistryError::UnknownCode(code))
    }

    /// Get the prototype for `code`, if any.
    #[inline]
    pub fn get(&self, code: u16) -> Option<&dyn Protocol> {
        self.by_code.get(&code).map(|p| p.as_ref())
    }

    /// Get the code registered for kind `T`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnregisteredType`] if `T` was never registered.
    pub fn reverse_lookup<T: ProtocolKind>(&self) -> Result<u16> {
        self.by_kind
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(RegistryError::UnregisteredType(T::NAME))
    }

    /// Get the code for the concrete kind behind a trait object.
    pub fn code_of(&self, message: &dyn Protocol) -> Result<u16> {
        self.by_kind
            .get(&message.kind_id())
            .copied()
            .ok_or(RegistryError::UnregisteredType(message.name()))
    }

    /// Create a fresh, zero-valued message of the kind registered under `code`.
    ///
    /// Every call returns a new, independently owned object; the shared
    /// prototype is never handed out.
    pub fn new_instance(&self, code: u16) -> Result<Box<dyn Protocol>> {
        Ok(self.lookup(code)?.new_instance())
    }

    /// Decode a body into a fresh message of the kind registered under `code`.
    pub fn decode(&self, code: u16, body: &[u8]) -> Result<Box<dyn Protocol>> {
        let mut message = self.new_instance(code)?;
        message.decode(body)?;
        Ok(message)
    }

    /// Encode a message, returning its code and body.
    pub fn encode(&self, message: &dyn Protocol) -> Result<(u16, Vec<u8>)> {
        let code = self.code_of(message)?;
        Ok((code, message.encode()?))
    }

    /// Verify that every kind in `kinds` has a code.
    ///
    /// Run once at startup over every kind the encoder can emit, so an
    /// unregistered kind fails the process before it can write a bad packet.
    pub fn self_check(&self, kinds: &[KindId]) -> Result<()> {
        for kind in kinds {
            if !self.by_kind.contains_key(&kind.id()) {
                tracing::error!("Protocol {} has no registered code", kind.name());
                return Err(RegistryError::UnregisteredType(kind.name()));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, code: u16) -> bool {
        self.by_code.contains_key(&code)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// All registered codes, ascending.
    pub fn codes(&self) -> Vec<u16> {
        let mut codes: Vec<u16> = self.by_code.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// All rows, ascending by code.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        self.codes()
            .into_iter()
            .filter_map(|code| {
                self.get(code).map(|p| RegistryEntry {
                    code,
                    name: p.name(),
                    family: p.family(),
                })
            })
            .collect()
    }

    /// Describe the code space for comparison with a peer.
    pub fn manifest(&self) -> Manifest {
        Manifest::from_entries(self.entries())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Open a new building phase seeded with this table's entries.
    ///
    /// Prototypes are copied with `new_instance`, so the new table shares
    /// nothing with this one.
    ///
    /// # Errors
    ///
    /// Any registration error raised while copying an entry. The partial
    /// builder is discarded.
    pub fn to_builder(&self) -> Result<RegistryBuilder> {
        let mut builder = RegistryBuilder::with_config(self.config.clone());
        for (&code, prototype) in &self.by_code {
            builder.register_prototype(code, prototype.new_instance())?;
        }
        Ok(builder)
    }
}

impl std::fmt::Debug for ProtocolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolRegistry")
            .field("entries", &self.entries())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{
        Error, Heartbeat, Message, PairLong, Ping, Pong, UdpHelloRequest, UdpHelloResponse,
    };

    fn seeded() -> ProtocolRegistry {
        let mut builder = ProtocolRegistry::builder();
        builder
            .register::<Message>(100)
            .unwrap()
            .register::<Heartbeat>(102)
            .unwrap()
            .register::<UdpHelloRequest>(1200)
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_lookup_returns_registered_kind() {
        let registry = seeded();

        let prototype = registry.lookup(102).unwrap();
        assert!(prototype.is::<Heartbeat>());
        assert_eq!(prototype.name(), "Heartbeat");
    }

    #[test]
    fn test_lookup_is_stable() {
        let registry = seeded();

        let first = registry.lookup(100).unwrap();
        let second = registry.lookup(100).unwrap();
        assert!(std::ptr::addr_eq(first, second));
        assert_eq!(first.kind_id(), second.kind_id());
    }

    #[test]
    fn test_lookup_unknown_code() {
        let registry = seeded();

        let err = registry.lookup(999).err().unwrap();
        assert!(matches!(err, RegistryError::UnknownCode(999)));
        assert!(err.is_recoverable());
        assert!(registry.get(9999).is_none());
        assert!(matches!(
            registry.new_instance(9999),
            Err(RegistryError::UnknownCode(9999))
        ));
    }

    #[test]
    fn test_reverse_lookup_round_trip() {
        let registry = seeded();

        for code in registry.codes() {
            let prototype = registry.lookup(code).unwrap();
            assert_eq!(registry.code_of(prototype).unwrap(), code);
        }
        assert_eq!(registry.reverse_lookup::<UdpHelloRequest>().unwrap(), 1200);
    }

    #[test]
    fn test_reverse_lookup_unregistered() {
        let registry = seeded();

        let err = registry.reverse_lookup::<UdpHelloResponse>().err().unwrap();
        assert!(matches!(err, RegistryError::UnregisteredType("UdpHelloResponse")));
        assert!(!err.is_recoverable());

        let pong = Pong { time: 1 };
        assert!(registry.code_of(&pong).is_err());
    }

    #[test]
    fn test_new_instance_is_fresh_and_independent() {
        let registry = seeded();

        let mut first = registry.new_instance(100).unwrap();
        let second = registry.new_instance(100).unwrap();

        first.downcast_mut::<Message>().unwrap().message = "changed".to_string();

        assert_eq!(second.downcast_ref::<Message>(), Some(&Message::default()));
        let prototype = registry.lookup(100).unwrap();
        assert_eq!(prototype.downcast_ref::<Message>(), Some(&Message::default()));
        assert!(!std::ptr::addr_eq(&*first, prototype));
    }

    #[test]
    fn test_encode_decode_through_registry() {
        let registry = seeded();
        let message = Message {
            module: 2,
            code: 7,
            message: "hi".to_string(),
        };

        let (code, body) = registry.encode(&message).unwrap();
        assert_eq!(code, 100);

        let decoded = registry.decode(code, &body).unwrap();
        assert_eq!(decoded.downcast_ref::<Message>(), Some(&message));
    }

    #[test]
    fn test_self_check() {
        let registry = seeded();

        assert!(registry
            .self_check(&[KindId::of::<Message>(), KindId::of::<Heartbeat>()])
            .is_ok());

        let err = registry
            .self_check(&[KindId::of::<Message>(), KindId::of::<Error>()])
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::UnregisteredType("Error")));
    }

    #[test]
    fn test_entries_sorted() {
        let mut builder = ProtocolRegistry::builder();
        builder
            .register::<PairLong>(111)
            .unwrap()
            .register::<Ping>(103)
            .unwrap()
            .register::<UdpHelloRequest>(1200)
            .unwrap();
        let registry = builder.build();

        assert_eq!(registry.codes(), vec![103, 111, 1200]);
        let entries = registry.entries();
        assert_eq!(entries[0].name, "Ping");
        assert_eq!(entries[2].family, CodeFamily::Handshake);
    }

    #[test]
    fn test_to_builder_copies_entries() {
        let registry = seeded();

        let mut builder = registry.to_builder().unwrap();
        assert_eq!(builder.len(), 3);
        builder.register::<Ping>(103).unwrap();
        assert!(builder.register::<Message>(101).is_err());

        let extended = builder.build();
        assert_eq!(extended.len(), 4);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_to_builder_propagates_copy_errors() {
        let mut by_code: HashMap<u16, Box<dyn Protocol>> = HashMap::new();
        by_code.insert(5, Box::new(Ping::default()));
        let mut by_kind = HashMap::new();
        by_kind.insert(TypeId::of::<Ping>(), 5);
        let registry = ProtocolRegistry::from_parts(by_code, by_kind, RegistryConfig::default());

        let err = registry.to_builder().err().unwrap();
        assert!(matches!(err, RegistryError::ReservedCode(5)));
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ProtocolRegistry>();
    }
}
