use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// An observer's X25519 public key, submitted at request time.
///
/// The batch owner seals the batch's symmetric master key to this key, so
/// only the observer holding the matching private key can recover it. The
/// ledger treats it as opaque 32-byte material.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExchangePublicKey([u8; 32]);

impl ExchangePublicKey {
    /// Create from raw 32-byte key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The raw 32 bytes.
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

impl From<[u8; 32]> for ExchangePublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ExchangePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExchangePublicKey({})", hex::encode(&self.0[..4]))
    }
}

/// A batch master key sealed to one specific observer.
///
/// Produced off-ledger by the batch owner: the symmetric master key is
/// encrypted under the observer's [`ExchangePublicKey`]. The ledger stores
/// and serves the ciphertext without ever handling the plaintext key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedMasterKey(Vec<u8>);

impl SealedMasterKey {
    /// Wrap sealed ciphertext bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The sealed ciphertext.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the sealed ciphertext in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the ciphertext is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for SealedMasterKey {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for SealedMasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealedMasterKey({} bytes)", self.0.len())
    }
}
