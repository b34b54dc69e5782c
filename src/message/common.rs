//! Generic payload kinds (codes 100-999).
//!
//! Transport-agnostic messages every peer understands: notices, errors,
//! liveness probes and small key/value tuples.

use serde::{Deserialize, Serialize};

use super::ProtocolKind;
use crate::registry::CodeFamily;

/// Implement [`ProtocolKind`] for a list of `Type => "Name"` pairs.
macro_rules! protocol_kinds {
    ($family:expr; $($ty:ty => $name:literal),+ $(,)?) => {
        $(
            impl ProtocolKind for $ty {
                const NAME: &'static str = $name;
                const FAMILY: CodeFamily = $family;
            }
        )+
    };
}

pub(super) use protocol_kinds;

/// Free-form notice from a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Message {
    pub module: u8,
    pub code: i32,
    pub message: String,
}

/// Error report from a module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Error {
    pub module: u8,
    pub error_code: i32,
    pub error_message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heartbeat {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {}

/// Reply to [`Ping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pong {
    /// Responder clock, milliseconds since the Unix epoch.
    pub time: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairLong {
    pub key: i64,
    pub value: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairString {
    pub key: String,
    pub value: String,
}

/// Pair of long key and string value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairLS {
    pub key: i64,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripleLong {
    pub left: i64,
    pub middle: i64,
    pub right: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripleString {
    pub left: String,
    pub middle: String,
    pub right: String,
}

/// Triple of long, string, string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripleLSS {
    pub left: i64,
    pub middle: String,
    pub right: String,
}

protocol_kinds! {
    CodeFamily::Generic;
    Message => "Message",
    Error => "Error",
    Heartbeat => "Heartbeat",
    Ping => "Ping",
    Pong => "Pong",
    PairLong => "PairLong",
    PairString => "PairString",
    PairLS => "PairLS",
    TripleLong => "TripleLong",
    TripleString => "TripleString",
    TripleLSS => "TripleLSS",
}
