//! `0x`-prefixed hex encoding used for ledger words, addresses and payloads.

use crate::error::{DomainError, DomainResult};

/// Encode bytes as a lowercase `0x`-prefixed hex string.
pub fn encode(bytes: &[u8]) -> String {
    format!("0x{}", ::hex::encode(bytes))
}

/// Decode a hex string (with or without `0x` prefix) into bytes.
///
/// An odd number of digits is accepted and treated as having a leading zero nibble.
pub fn decode(s: &str) -> DomainResult<Vec<u8>> {
    let digits = strip_prefix(s);
    let decoded = if digits.len() % 2 == 1 {
        ::hex::decode(format!("0{digits}"))
    } else {
        ::hex::decode(digits)
    };
    decoded.map_err(|e| DomainError::invalid_hex(format!("{s:?}: {e}")))
}

/// Returns the digits after an optional `0x`/`0X` prefix.
pub fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Serde adapter for `Vec<u8>` fields carried as hex strings.
pub mod serde_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::decode(&s).map_err(serde::de::Error::custom)
    }
}
