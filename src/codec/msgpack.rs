//! MsgPack codec using `rmp-serde`.
//!
//! **Always use the `_named` encoders.** Bodies are struct-as-map so that
//! peers written in other languages can add or reorder fields without
//! breaking positional decoding. A field missing from the map falls back to
//! its `Default` when the struct is marked `#[serde(default)]`.
//!
//! # Example
//!
//! ```
//! use protocol_registry::codec::MsgPackCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Pong {
//!     time: i64,
//! }
//!
//! let pong = Pong { time: 1_700_000_000_000 };
//! let encoded = MsgPackCodec::encode(&pong).unwrap();
//! let decoded: Pong = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, pong);
//! ```

use std::io::Cursor;

use bytes::{BufMut, BytesMut};
use serde::Deserialize;

use crate::error::{RegistryError, Result};

/// MessagePack codec for protocol bodies.
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Encode a value to MsgPack bytes (struct-as-map).
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    /// Encode a value, appending to an existing buffer.
    ///
    /// Used by the packet encoder to write the body right after the code
    /// prefix without an intermediate allocation.
    #[inline]
    pub fn encode_into<T: serde::Serialize + ?Sized>(value: &T, buf: &mut BytesMut) -> Result<()> {
        let mut writer = buf.writer();
        rmp_serde::encode::write_named(&mut writer, value)?;
        Ok(())
    }

    /// Decode MsgPack bytes to a value.
    ///
    /// The slice must hold exactly one value.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes cannot be deserialized to type T, or
    /// `Protocol` if bytes remain after the value.
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        let mut cursor = Cursor::new(bytes);
        let value = {
            let mut de = rmp_serde::Deserializer::new(&mut cursor);
            T::deserialize(&mut de)?
        };

        let consumed = cursor.position() as usize;
        if consumed < bytes.len() {
            return Err(RegistryError::Protocol(format!(
                "{} trailing bytes after body",
                bytes.len() - consumed
            )));
        }
        Ok(value)
    }
}
