//! Packet router - dispatches decoded packets to typed handlers by code.
//!
//! Handlers are keyed by kind, and the router resolves each kind's code
//! through the registry when it is built. A handler for a kind without a
//! code is a startup error, not a silent no-op.
//!
//! # Example
//!
//! ```ignore
//! use protocol_registry::handler::PacketRouter;
//! use protocol_registry::message::{Ping, Pong};
//!
//! let router = PacketRouter::builder(registry.clone())
//!     .on(|_ping: Ping, ctx| async move {
//!         ctx.reply(&Pong { time: 0 }).await
//!     })?
//!     .build();
//!
//! router.dispatch(bytes).await?;
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

use super::PacketContext;
use crate::error::{RegistryError, Result};
use crate::message::{Protocol, ProtocolKind};
use crate::protocol::Packet;
use crate::registry::ProtocolRegistry;

/// Result type for handler functions.
pub type HandlerResult = Result<()>;

/// Boxed future for handler results.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for packet handlers.
pub trait Handler: Send + Sync + 'static {
    /// Handle a decoded message.
    fn call(&self, message: Box<dyn Protocol>, ctx: PacketContext) -> BoxFuture<'static, HandlerResult>;
}

/// Wrapper that downcasts the decoded message before calling the handler.
pub struct TypedHandler<F, T, Fut>
where
    F: Fn(T, PacketContext) -> Fut + Send + Sync + 'static,
    T: ProtocolKind,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    handler: F,
    _phantom: PhantomData<fn(T) -> Fut>,
}

impl<F, T, Fut> TypedHandler<F, T, Fut>
where
    F: Fn(T, PacketContext) -> Fut + Send + Sync + 'static,
    T: ProtocolKind,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, T, Fut> Handler for TypedHandler<F, T, Fut>
where
    F: Fn(T, PacketContext) -> Fut + Send + Sync + 'static,
    T: ProtocolKind,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, message: Box<dyn Protocol>, ctx: PacketContext) -> BoxFuture<'static, HandlerResult> {
        let typed = match message.downcast::<T>() {
            Ok(v) => *v,
            Err(other) => {
                let err = RegistryError::Protocol(format!(
                    "Handler for {} received {}",
                    T::NAME,
                    other.name()
                ));
                return Box::pin(async move { Err(err) });
            }
        };

        Box::pin((self.handler)(typed, ctx))
    }
}

/// Builder for a [`PacketRouter`].
pub struct PacketRouterBuilder {
    registry: Arc<ProtocolRegistry>,
    handlers: HashMap<u16, Box<dyn Handler>>,
    outbound: Option<mpsc::Sender<Bytes>>,
    max_concurrent_handlers: usize,
}

impl PacketRouterBuilder {
    fn new(registry: Arc<ProtocolRegistry>) -> Self {
        let max_concurrent_handlers = registry.config().max_concurrent_handlers;
        Self {
            registry,
            handlers: HashMap::new(),
            outbound: None,
            max_concurrent_handlers,
        }
    }

    /// Register the handler for kind `T`.
    ///
    /// # Errors
    ///
    /// - `UnregisteredType` if `T` has no code in the registry
    /// - `DuplicateType` if `T` already has a handler
    pub fn on<F, T, Fut>(mut self, handler: F) -> Result<Self>
    where
        F: Fn(T, PacketContext) -> Fut + Send + Sync + 'static,
        T: ProtocolKind,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let code = self.registry.reverse_lookup::<T>()?;
        if self.handlers.contains_key(&code) {
            return Err(RegistryError::DuplicateType { name: T::NAME, code });
        }

        self.handlers.insert(code, Box::new(TypedHandler::new(handler)));
        Ok(self)
    }

    /// Send handler replies to this queue.
    pub fn outbound(mut self, tx: mpsc::Sender<Bytes>) -> Self {
        self.outbound = Some(tx);
        self
    }

    /// Set the maximum number of concurrent handlers for [`PacketRouter::route`].
    ///
    /// When this limit is reached, new packets are dropped with a warning.
    /// Default: `RegistryConfig::max_concurrent_handlers`
    pub fn max_concurrent_handlers(mut self, limit: usize) -> Self {
        self.max_concurrent_handlers = limit;
        self
    }

    /// Finish the router.
    ///
    /// The handler limit is clamped to `1..=Semaphore::MAX_PERMITS`.
    pub fn build(self) -> PacketRouter {
        let limit = self.max_concurrent_handlers.clamp(1, Semaphore::MAX_PERMITS);
        if limit != self.max_concurrent_handlers {
            tracing::warn!(
                "max_concurrent_handlers {} out of range, using {}",
                self.max_concurrent_handlers,
                limit
            );
        }

        PacketRouter {
            registry: self.registry,
            handlers: self.handlers,
            outbound: self.outbound,
            semaphore: Arc::new(Semaphore::new(limit)),
        }
    }
}

/// Routes code-prefixed packets to handlers.
pub struct PacketRouter {
    registry: Arc<ProtocolRegistry>,
    handlers: HashMap<u16, Box<dyn Handler>>,
    outbound: Option<mpsc::Sender<Bytes>>,
    semaphore: Arc<Semaphore>,
}

impl PacketRouter {
    /// Start building a router over `registry`.
    pub fn builder(registry: Arc<ProtocolRegistry>) -> PacketRouterBuilder {
        PacketRouterBuilder::new(registry)
    }

    pub fn registry(&self) -> &Arc<ProtocolRegistry> {
        &self.registry
    }

    /// Check if a handler exists for `code`.
    pub fn has_handler(&self, code: u16) -> bool {
        self.handlers.contains_key(&code)
    }

    /// Decode one packet and run its handler to completion.
    ///
    /// # Errors
    ///
    /// - `UnknownCode` if the registry does not know the code
    /// - `HandlerNotFound` if the code is known but unhandled
    /// - decode errors and whatever the handler returns
    pub async fn dispatch(&self, bytes: Bytes) -> Result<()> {
        let packet = Packet::parse(bytes, self.registry.config().max_body_size)?;
        let code = packet.code;

        if !self.registry.contains(code) {
            return Err(RegistryError::UnknownCode(code));
        }
        let handler = self
            .handlers
            .get(&code)
            .ok_or(RegistryError::HandlerNotFound(code))?;

        let message = self.registry.decode(code, packet.body())?;
        let ctx = match &self.outbound {
            Some(tx) => PacketContext::with_outbound(code, self.registry.clone(), tx.clone()),
            None => PacketContext::new(code, self.registry.clone()),
        };

        handler.call(message, ctx).await
    }

    /// Dispatch on a spawned task, bounded by the handler limit.
    ///
    /// Never fails: per-packet errors are logged and the packet dropped.
    /// Returns `None` if the packet was dropped for lack of capacity.
    pub fn route(self: &Arc<Self>, bytes: Bytes) -> Option<JoinHandle<()>> {
        let permit = match self.semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(
                    "Handler capacity reached, dropping packet of {} bytes",
                    bytes.len()
                );
                return None;
            }
        };

        let router = self.clone();
        Some(tokio::spawn(async move {
            // Permit is held until this task completes
            let _permit = permit;

            match router.dispatch(bytes).await {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("Dropped packet: {}", e);
                }
                Err(e) => {
                    tracing::error!("Handler error: {}", e);
                }
            }
        }))
    }
}
