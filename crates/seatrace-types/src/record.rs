use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// 256-bit content digest of one encrypted telemetry batch entry.
///
/// The fingerprint is computed over the ciphertext bytes, not the
/// plaintext, binding the ledger record to the exact encrypted artifact an
/// approved observer will later receive. The ledger never recomputes or
/// verifies the digest against any off-ledger data; it is accepted as
/// supplied by the authorized writer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of ciphertext bytes (raw BLAKE3).
    pub fn of_ciphertext(ciphertext: &[u8]) -> Self {
        Self(*blake3::hash(ciphertext).as_bytes())
    }

    /// The raw 32-byte digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl From<[u8; 32]> for Fingerprint {
    fn from(digest: [u8; 32]) -> Self {
        Self(digest)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// One append-only entry in a data account's fingerprint sequence.
///
/// Field order is part of the persisted record layout:
/// `(fingerprint: 32B, auth_tag: bytes, iv: bytes, timestamp_ms: i64)`.
/// The auth tag and IV are opaque AEAD parameters produced off-ledger by
/// the ship when it encrypted the batch entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRecord {
    pub fingerprint: Fingerprint,
    pub auth_tag: Vec<u8>,
    pub iv: Vec<u8>,
    pub timestamp_ms: i64,
}

impl FingerprintRecord {
    /// Create a new record.
    pub fn new(fingerprint: Fingerprint, auth_tag: Vec<u8>, iv: Vec<u8>, timestamp_ms: i64) -> Self {
        Self {
            fingerprint,
            auth_tag,
            iv,
            timestamp_ms,
        }
    }
}
