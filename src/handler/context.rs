//! Packet context for handlers.
//!
//! Carries the code of the packet being handled and, when the router is
//! attached to a connection, the outbound queue replies go to:
//! - `reply` - encode a message with its registered code and queue it
//! - `reply_packet` - queue an already encoded packet
//!
//! # Example
//!
//! ```ignore
//! async fn on_ping(_ping: Ping, ctx: PacketContext) -> Result<()> {
//!     ctx.reply(&Pong { time: now_millis() }).await
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::error::{RegistryError, Result};
use crate::message::Protocol;
use crate::protocol::encode_packet;
use crate::registry::ProtocolRegistry;

/// Context passed to packet handlers.
///
/// `PacketContext` is `Clone`; clones share the same outbound queue.
#[derive(Clone)]
pub struct PacketContext {
    /// Code of the packet being handled.
    code: u16,
    /// Registry used to encode replies.
    registry: Arc<ProtocolRegistry>,
    /// Queue drained by the connection's writer.
    outbound: Option<mpsc::Sender<Bytes>>,
}

impl PacketContext {
    /// Create a context without an outbound queue (replies are discarded).
    pub fn new(code: u16, registry: Arc<ProtocolRegistry>) -> Self {
        Self {
            code,
            registry,
            outbound: None,
        }
    }

    /// Create a context whose replies go to `outbound`.
    pub fn with_outbound(
        code: u16,
        registry: Arc<ProtocolRegistry>,
        outbound: mpsc::Sender<Bytes>,
    ) -> Self {
        Self {
            code,
            registry,
            outbound: Some(outbound),
        }
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[inline]
    pub fn registry(&self) -> &Arc<ProtocolRegistry> {
        &self.registry
    }

    /// Encode `message` with its registered code and queue it.
    pub async fn reply(&self, message: &dyn Protocol) -> Result<()> {
        let packet = encode_packet(&self.registry, message)?;
        self.reply_packet(packet).await
    }

    /// Queue an encoded packet.
    pub async fn reply_packet(&self, packet: Bytes) -> Result<()> {
        let outbound = match &self.outbound {
            Some(tx) => tx,
            None => return Ok(()),
        };

        outbound
            .send(packet)
            .await
            .map_err(|_| RegistryError::ConnectionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Ping, Pong};
    use crate::protocol::decode_packet;

    fn registry() -> Arc<ProtocolRegistry> {
        let mut builder = ProtocolRegistry::builder();
        builder
            .register::<Ping>(103)
            .unwrap()
            .register::<Pong>(104)
            .unwrap();
        Arc::new(builder.build())
    }

    #[tokio::test]
    async fn test_reply_without_outbound_is_noop() {
        let ctx = PacketContext::new(103, registry());
        assert_eq!(ctx.code(), 103);
        assert!(ctx.reply(&Pong { time: 1 }).await.is_ok());
    }

    #[tokio::test]
    async fn test_reply_is_encoded_with_code() {
        let registry = registry();
        let (tx, mut rx) = mpsc::channel(4);
        let ctx = PacketContext::with_outbound(103, registry.clone(), tx);

        ctx.reply(&Pong { time: 99 }).await.unwrap();

        let packet = rx.recv().await.unwrap();
        assert_eq!(&packet[..2], &[0x00, 0x68]);
        let decoded = decode_packet(&registry, &packet).unwrap();
        assert_eq!(decoded.downcast_ref::<Pong>(), Some(&Pong { time: 99 }));
    }

    #[tokio::test]
    async fn test_reply_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let ctx = PacketContext::with_outbound(103, registry(), tx);

        let err = ctx.reply(&Ping::default()).await.err().unwrap();
        assert!(matches!(err, RegistryError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_reply_unregistered_kind() {
        let (tx, _rx) = mpsc::channel(1);
        let ctx = PacketContext::with_outbound(103, registry(), tx);

        let err = ctx
            .reply(&crate::message::Heartbeat::default())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, RegistryError::UnregisteredType("Heartbeat")));
    }
}
