//! Error types for protocol-registry.

use thiserror::Error;

use crate::registry::CodeFamily;

/// Main error type for all registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No protocol is registered under this code.
    #[error("Unknown protocol code: {0}")]
    UnknownCode(u16),

    /// The code is already claimed by another kind.
    #[error("Code {code} already registered to {existing}, rejected {attempted}")]
    DuplicateCode {
        code: u16,
        existing: &'static str,
        attempted: &'static str,
    },

    /// The kind already owns a code.
    #[error("Protocol {name} already registered under code {code}")]
    DuplicateType { name: &'static str, code: u16 },

    /// Codes 0-99 are never assigned.
    #[error("Code {0} is reserved")]
    ReservedCode(u16),

    /// The code lies outside the block owned by the kind's family.
    #[error("Code {code} for {name} is outside the {family} range")]
    CodeOutsideFamily {
        code: u16,
        name: &'static str,
        family: CodeFamily,
    },

    /// The concrete kind was never registered (encode path).
    #[error("Unregistered protocol type: {0}")]
    UnregisteredType(&'static str),

    /// Code is known but the router has no handler for it.
    #[error("Handler not found for code: {0}")]
    HandlerNotFound(u16),

    /// Outbound channel closed before a reply could be queued.
    #[error("Connection closed")]
    ConnectionClosed,

    /// A configuration value is out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// I/O error while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (manifest, config).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Malformed packet.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl RegistryError {
    /// Whether the error only affects a single packet.
    ///
    /// Recoverable errors mean "drop this frame and keep the connection".
    /// Everything else is a startup or programming error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RegistryError::UnknownCode(_)
                | RegistryError::HandlerNotFound(_)
                | RegistryError::MsgPackDecode(_)
                | RegistryError::Protocol(_)
        )
    }
}

/// Result type alias using RegistryError.
pub type Result<T> = std::result::Result<T, RegistryError>;
