use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Public signer identity for a ship, external observer, or the ship
/// management authority.
///
/// A `PublicId` is the raw 32-byte Ed25519 public key of the signer. It is
/// the fundamental authorization anchor in Seatrace: every account records
/// the `PublicId` that is allowed to mutate it, and every request is
/// checked against the identity that signed it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicId {
    bytes: [u8; 32],
}

impl PublicId {
    /// Create from raw 32-byte public key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }

    /// The raw 32 bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Full hex-encoded string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.bytes)
    }

    /// Short identifier (first 8 hex characters).
    pub fn short_id(&self) -> String {
        format!("id:{}", hex::encode(&self.bytes[..4]))
    }

    /// Parse from a hex string (64 hex characters, optional `id:` prefix).
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("id:").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self { bytes: arr })
    }

    /// A random identity for tests and demos.
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self { bytes }
    }
}

impl From<[u8; 32]> for PublicId {
    fn from(bytes: [u8; 32]) -> Self {
        Self { bytes }
    }
}

impl fmt::Debug for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicId({})", self.short_id())
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_roundtrip() {
        let id = PublicId::from_bytes([42u8; 32]);
        assert_eq!(id.as_bytes(), &[42u8; 32]);
    }

    #[test]
    fn ephemeral_ids_are_unique() {
        let id1 = PublicId::ephemeral();
        let id2 = PublicId::ephemeral();
        assert_ne!(id1, id2);
    }

    #[test]
    fn short_id_format() {
        let id = PublicId::from_bytes([0; 32]);
        let short = id.short_id();
        assert!(short.starts_with("id:"));
        assert_eq!(short.len(), 11); // "id:" + 8 hex chars
    }

    #[test]
    fn hex_roundtrip() {
        let id = PublicId::from_bytes([99; 32]);
        let parsed = PublicId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn hex_roundtrip_with_prefix() {
        let id = PublicId::from_bytes([7; 32]);
        let prefixed = format!("id:{}", id.to_hex());
        let parsed = PublicId::from_hex(&prefixed).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = PublicId::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 32,
                actual: 2
            }
        );
    }

    #[test]
    fn serde_roundtrip() {
        let id = PublicId::from_bytes([10; 32]);
        let json = serde_json::to_string(&id).unwrap();
        let parsed: PublicId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn ordering_is_consistent() {
        let id1 = PublicId::from_bytes([0; 32]);
        let id2 = PublicId::from_bytes([1; 32]);
        assert!(id1 < id2);
    }
}
