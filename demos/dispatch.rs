//! Dispatch demo.
//!
//! Builds the standard table, prints its manifest, and pushes a few packets
//! through a router, including one with a code this side does not know.
//!
//! Run with `RUST_LOG=debug cargo run --example dispatch`.

use std::sync::Arc;

use bytes::Bytes;
use protocol_registry::message::{Ping, Pong, UdpHelloRequest, UdpHelloResponse};
use protocol_registry::protocol::{decode_packet, encode_packet};
use protocol_registry::standard::standard_registry;
use protocol_registry::{PacketRouter, Result};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let registry = Arc::new(standard_registry()?);
    println!("{}", registry.manifest().to_json()?);

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let router = Arc::new(
        PacketRouter::builder(registry.clone())
            .on(|_: Ping, ctx| async move { ctx.reply(&Pong { time: 0 }).await })?
            .on(|hello: UdpHelloRequest, ctx| async move {
                let response = UdpHelloResponse {
                    message: format!("Hello from server, you said: {}", hello.message),
                };
                ctx.reply(&response).await
            })?
            .outbound(tx)
            .build(),
    );

    let hello = UdpHelloRequest {
        message: "Hello, this is the udp client!".to_string(),
    };
    let incoming = vec![
        encode_packet(&registry, &Ping::default())?,
        encode_packet(&registry, &hello)?,
        Bytes::from_static(&[0x27, 0x0F, 0x80]),
    ];

    for bytes in incoming {
        if let Some(handle) = router.route(bytes) {
            if let Err(e) = handle.await {
                tracing::error!("Handler task failed: {}", e);
            }
        }
    }
    drop(router);

    while let Some(reply) = rx.recv().await {
        let message = decode_packet(&registry, &reply)?;
        println!("reply: {:?}", message);
    }

    Ok(())
}
