//! The standard code table.
//!
//! This is the composition root's view of the code space: call
//! [`standard_registry`] once at startup, before accepting connections, and
//! pass the result by `Arc` to decoders and encoders.
//!
//! Codes are a wire contract. Never reuse or renumber an entry; retire it
//! and claim a new code instead.

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::message::*;
use crate::registry::{ProtocolRegistry, RegistryBuilder};

/// Standard protocol codes.
pub mod codes {
    pub const MESSAGE: u16 = 100;
    pub const ERROR: u16 = 101;
    pub const HEARTBEAT: u16 = 102;
    pub const PING: u16 = 103;
    pub const PONG: u16 = 104;
    pub const PAIR_LONG: u16 = 111;
    pub const PAIR_STRING: u16 = 112;
    pub const PAIR_LS: u16 = 113;
    pub const TRIPLE_LONG: u16 = 114;
    pub const TRIPLE_STRING: u16 = 115;
    pub const TRIPLE_LSS: u16 = 116;

    pub const UDP_HELLO_REQUEST: u16 = 1200;
    pub const UDP_HELLO_RESPONSE: u16 = 1201;
    pub const TCP_HELLO_REQUEST: u16 = 1300;
    pub const TCP_HELLO_RESPONSE: u16 = 1301;
    pub const JPROTOBUF_HELLO_REQUEST: u16 = 1500;
    pub const JPROTOBUF_HELLO_RESPONSE: u16 = 1501;
    pub const JSON_HELLO_REQUEST: u16 = 1600;
    pub const JSON_HELLO_RESPONSE: u16 = 1601;

    pub const GATEWAY_TO_PROVIDER_REQUEST: u16 = 5000;
    pub const GATEWAY_TO_PROVIDER_RESPONSE: u16 = 5001;
}

/// Build the standard table with the default config.
///
/// # Errors
///
/// Any registration or self-check failure. Treat it as fatal.
pub fn standard_registry() -> Result<ProtocolRegistry> {
    standard_registry_with(RegistryConfig::default())
}

/// Build the standard table with `config`, then run the self-check.
pub fn standard_registry_with(config: RegistryConfig) -> Result<ProtocolRegistry> {
    let mut builder = RegistryBuilder::with_config(config);
    register_standard(&mut builder)?;

    let registry = builder.build();
    registry.self_check(&emitted_kinds())?;
    Ok(registry)
}

/// Register every standard kind into an existing builder.
///
/// Lets an application add its own family on top of the standard table.
pub fn register_standard(builder: &mut RegistryBuilder) -> Result<()> {
    builder
        .register::<Message>(codes::MESSAGE)?
        .register::<Error>(codes::ERROR)?
        .register::<Heartbeat>(codes::HEARTBEAT)?
        .register::<Ping>(codes::PING)?
        .register::<Pong>(codes::PONG)?
        .register::<PairLong>(codes::PAIR_LONG)?
        .register::<PairString>(codes::PAIR_STRING)?
        .register::<PairLS>(codes::PAIR_LS)?
        .register::<TripleLong>(codes::TRIPLE_LONG)?
        .register::<TripleString>(codes::TRIPLE_STRING)?
        .register::<TripleLSS>(codes::TRIPLE_LSS)?
        .register::<UdpHelloRequest>(codes::UDP_HELLO_REQUEST)?
        .register::<UdpHelloResponse>(codes::UDP_HELLO_RESPONSE)?
        .register::<TcpHelloRequest>(codes::TCP_HELLO_REQUEST)?
        .register::<TcpHelloResponse>(codes::TCP_HELLO_RESPONSE)?
        .register::<JProtobufHelloRequest>(codes::JPROTOBUF_HELLO_REQUEST)?
        .register::<JProtobufHelloResponse>(codes::JPROTOBUF_HELLO_RESPONSE)?
        .register::<JsonHelloRequest>(codes::JSON_HELLO_REQUEST)?
        .register::<JsonHelloResponse>(codes::JSON_HELLO_RESPONSE)?
        .register::<GatewayToProviderRequest>(codes::GATEWAY_TO_PROVIDER_REQUEST)?
        .register::<GatewayToProviderResponse>(codes::GATEWAY_TO_PROVIDER_RESPONSE)?;
    Ok(())
}

/// Every standard kind an encoder may emit.
pub fn emitted_kinds() -> Vec<KindId> {
    vec![
        KindId::of::<Message>(),
        KindId::of::<Error>(),
        KindId::of::<Heartbeat>(),
        KindId::of::<Ping>(),
        KindId::of::<Pong>(),
        KindId::of::<PairLong>(),
        KindId::of::<PairString>(),
        KindId::of::<PairLS>(),
        KindId::of::<TripleLong>(),
        KindId::of::<TripleString>(),
        KindId::of::<TripleLSS>(),
        KindId::of::<UdpHelloRequest>(),
        KindId::of::<UdpHelloResponse>(),
        KindId::of::<TcpHelloRequest>(),
        KindId::of::<TcpHelloResponse>(),
        KindId::of::<JProtobufHelloRequest>(),
        KindId::of::<JProtobufHelloResponse>(),
        KindId::of::<JsonHelloRequest>(),
        KindId::of::<JsonHelloResponse>(),
        KindId::of::<GatewayToProviderRequest>(),
        KindId::of::<GatewayToProviderResponse>(),
    ]
}
