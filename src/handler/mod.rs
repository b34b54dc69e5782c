//! Handler module - packet dispatch.
//!
//! Provides:
//! - [`PacketRouter`] - maps codes to typed handlers
//! - [`PacketContext`] - lets handlers reply on the same connection
//!
//! # Example
//!
//! ```ignore
//! use protocol_registry::handler::PacketRouter;
//! use protocol_registry::message::{Heartbeat, Ping, Pong};
//!
//! let router = PacketRouter::builder(registry)
//!     .on(|_: Heartbeat, _ctx| async { Ok(()) })?
//!     .on(|_: Ping, ctx| async move { ctx.reply(&Pong::default()).await })?
//!     .outbound(tx)
//!     .build();
//! ```

mod context;
mod router;

pub use context::PacketContext;
pub use router::{BoxFuture, Handler, HandlerResult, PacketRouter, PacketRouterBuilder, TypedHandler};
