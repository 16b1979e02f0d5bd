//! Serialization Codec
//!
//! Turns caller values into the opaque bytes handed to a store and back.
//! The encoding is bincode with varint integers and no trailing bytes
//! allowed; it only has to round-trip within one deployment.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CacheError, Result};

fn options() -> impl Options {
    bincode::DefaultOptions::new()
}

/// Encodes `value` into bytes.
///
/// Fails with [`CacheError::Encode`] when the value cannot be serialized,
/// e.g. a `Serialize` impl that reports an error or a sequence of unknown
/// length.
pub fn encode<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    options().serialize(value).map_err(CacheError::Encode)
}

/// Decodes `bytes` into a `T`.
///
/// Fails with [`CacheError::Decode`] on truncated or malformed bytes, and
/// when the stored value does not have the layout of `T`.
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    options().deserialize(bytes).map_err(CacheError::Decode)
}
