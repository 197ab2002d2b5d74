//! Hex serde adapters
//!
//! Raw byte fields (transaction preimages, owner bytes, admin tags) travel as
//! lowercase hex strings in JSON bundles. Use with
//! `#[serde(with = "crate::shared::hex_serde")]`.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex::decode(s.trim()).map_err(serde::de::Error::custom)
}

/// Decode a fixed 32-byte value from hex
pub fn decode_array32(s: &str) -> Result<[u8; 32], String> {
    let bytes = hex::decode(s.trim()).map_err(|e| e.to_string())?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| format!("expected 32 bytes, got {}", bytes.len()))
}
