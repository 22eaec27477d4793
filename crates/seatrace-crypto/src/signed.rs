use serde::{Deserialize, Serialize};
use seatrace_types::PublicId;

use crate::signer::{Signature, SigningKey, VerifyingKey};

/// Domain tag mixed into every request signature.
const REQUEST_DOMAIN: &[u8] = b"seatrace-request-v1";

/// A request payload bound to its signer by an Ed25519 signature.
///
/// The signature covers the domain-tagged canonical bincode encoding of
/// the payload, so a signed request cannot be replayed as a different
/// operation kind. The ledger verifies the envelope before checking the
/// signer against the target account's authority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Signed<T> {
    pub payload: T,
    pub signer: PublicId,
    pub signature: Signature,
}

impl<T: Serialize> Signed<T> {
    /// Sign a payload with the given key.
    pub fn sign(key: &SigningKey, payload: T) -> Result<Self, SignedError> {
        let message = signing_bytes(&payload)?;
        let signature = key.sign(&message);
        Ok(Self {
            payload,
            signer: key.public_id(),
            signature,
        })
    }

    /// Verify the signature against the embedded signer identity.
    pub fn verify(&self) -> Result<(), SignedError> {
        let key = VerifyingKey::from_bytes(*self.signer.as_bytes())
            .map_err(|_| SignedError::InvalidSignerKey)?;
        let message = signing_bytes(&self.payload)?;
        key.verify(&message, &self.signature)
            .map_err(|_| SignedError::InvalidSignature)
    }
}

fn signing_bytes<T: Serialize>(payload: &T) -> Result<Vec<u8>, SignedError> {
    let encoded =
        bincode::serialize(payload).map_err(|e| SignedError::Serialization(e.to_string()))?;
    let mut message = Vec::with_capacity(REQUEST_DOMAIN.len() + 1 + encoded.len());
    message.extend_from_slice(REQUEST_DOMAIN);
    message.push(b':');
    message.extend_from_slice(&encoded);
    Ok(message)
}

/// Errors from signed-envelope operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignedError {
    #[error("signature does not match payload and signer")]
    InvalidSignature,
    #[error("signer identity is not a valid verifying key")]
    InvalidSignerKey,
    #[error("payload serialization error: {0}")]
    Serialization(String),
}
