//! Message module - the capability set shared by every message kind.
//!
//! Provides:
//! - [`Protocol`] - object-safe capabilities (`new_instance`, `encode`, `decode`)
//! - [`ProtocolKind`] - static description of a concrete kind (name, family)
//! - [`KindId`] - a kind's identity, for startup self-checks
//! - the built-in kinds: generic payloads, hello handshakes, gateway messages
//!
//! Any `ProtocolKind` is a `Protocol` through a blanket impl, so a new kind
//! is a `Default + Serialize + Deserialize` struct plus two constants.
//!
//! # Example
//!
//! ```
//! use protocol_registry::message::{Ping, Protocol, ProtocolKind};
//! use protocol_registry::registry::CodeFamily;
//!
//! let prototype = Ping::default();
//! let mut fresh: Box<dyn Protocol> = prototype.new_instance();
//! let body = fresh.encode().unwrap();
//! fresh.decode(&body).unwrap();
//!
//! assert_eq!(fresh.name(), "Ping");
//! assert_eq!(Ping::FAMILY, CodeFamily::Generic);
//! assert!(fresh.is::<Ping>());
//! ```

mod common;
mod gateway;
mod hello;

use std::any::{Any, TypeId};
use std::fmt;

use bytes::BytesMut;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::MsgPackCodec;
use crate::error::Result;
use crate::registry::CodeFamily;

pub use common::{
    Error, Heartbeat, Message, PairLS, PairLong, PairString, Ping, Pong, TripleLSS, TripleLong,
    TripleString,
};
pub use gateway::{GatewayToProviderRequest, GatewayToProviderResponse};
pub use hello::{
    JProtobufHelloRequest, JProtobufHelloResponse, JsonHelloRequest, JsonHelloResponse,
    TcpHelloRequest, TcpHelloResponse, UdpHelloRequest, UdpHelloResponse,
};

/// Capabilities every registered message offers.
///
/// The registry stores one zero-valued prototype per code behind this trait.
/// Decoders call [`new_instance`](Protocol::new_instance) on it and fill the
/// result with [`decode`](Protocol::decode); the prototype itself is never
/// handed out mutably.
pub trait Protocol: fmt::Debug + Send + Sync + 'static {
    /// Kind name (stable, used in manifests and logs).
    fn name(&self) -> &'static str;

    /// The code family this kind belongs to.
    fn family(&self) -> CodeFamily;

    /// Create a fresh, zero-valued instance of the same kind.
    fn new_instance(&self) -> Box<dyn Protocol>;

    /// Serialize the body.
    fn encode(&self) -> Result<Vec<u8>>;

    /// Serialize the body, appending to `buf`.
    fn encode_into(&self, buf: &mut BytesMut) -> Result<()>;

    /// Replace this value with the body decoded from `bytes`.
    fn decode(&mut self, bytes: &[u8]) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
}

/// Static description of a concrete message kind.
///
/// Implementors get [`Protocol`] for free.
///
/// Decoding is lenient by field: map keys the kind does not declare are
/// skipped, and declared fields absent from the map take their `Default`
/// (built-in kinds are `#[serde(default)]`). A body written by a newer or older
/// peer still decodes. The flip side is that a body for a different kind
/// sent under this kind's code can decode to an all-default value without
/// an error; only a body that is not a single MessagePack map, or has
/// trailing bytes, is rejected.
pub trait ProtocolKind:
    Default + Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static
{
    /// Kind name, unique across the code space.
    const NAME: &'static str;

    /// Family whose block the kind's code must fall in.
    const FAMILY: CodeFamily;
}

impl<T: ProtocolKind> Protocol for T {
    fn name(&self) -> &'static str {
        T::NAME
    }

    fn family(&self) -> CodeFamily {
        T::FAMILY
    }

    fn new_instance(&self) -> Box<dyn Protocol> {
        Box::new(T::default())
    }

    fn encode(&self) -> Result<Vec<u8>> {
        MsgPackCodec::encode(self)
    }

    fn encode_into(&self, buf: &mut BytesMut) -> Result<()> {
        MsgPackCodec::encode_into(self, buf)
    }

    fn decode(&mut self, bytes: &[u8]) -> Result<()> {
        *self = MsgPackCodec::decode(bytes)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }
}

impl dyn Protocol {
    /// Identity of the concrete kind behind the trait object.
    #[inline]
    pub fn kind_id(&self) -> TypeId {
        self.as_any().type_id()
    }

    /// Check whether the concrete kind is `T`.
    #[inline]
    pub fn is<T: Protocol>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Protocol>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Protocol>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Take ownership of the concrete value.
    ///
    /// Gives the box back unchanged if the kind is not `T`.
    pub fn downcast<T: Protocol>(self: Box<Self>) -> std::result::Result<Box<T>, Box<dyn Protocol>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(value),
            Err(_) => unreachable!("type checked before downcast"),
        }
    }
}

/// Identity and name of a kind, without an instance.
///
/// Used to list the kinds an encoder can emit so the startup self-check can
/// verify every one of them has a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId {
    type_id: TypeId,
    name: &'static str,
}

impl KindId {
    pub fn of<T: ProtocolKind>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: T::NAME,
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}
