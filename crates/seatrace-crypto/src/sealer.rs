use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Key, Nonce,
};
use curve25519_dalek::{montgomery::MontgomeryPoint, scalar::Scalar};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use seatrace_types::{ExchangePublicKey, SealedMasterKey};

/// Domain tag for the escrow key derivation.
const SEAL_DOMAIN: &[u8] = b"seatrace-escrow-v1";

const EPHEMERAL_PK_SIZE: usize = 32;
const NONCE_SIZE: usize = 12;
const AUTH_TAG_SIZE: usize = 16;
const MASTER_KEY_SIZE: usize = 32;

/// The symmetric key protecting one data batch's plaintext.
///
/// Generated and held only by the ship; never stored unencrypted on the
/// ledger. Zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; MASTER_KEY_SIZE]);

impl MasterKey {
    /// Generate a fresh random master key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; MASTER_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw 32-byte key material.
    pub fn from_bytes(bytes: [u8; MASTER_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MasterKey(<redacted>)")
    }
}

/// An observer's X25519 keypair for receiving escrowed master keys.
///
/// The public half is submitted with the access request; the secret half
/// stays with the observer and opens sealed keys after approval.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExchangeKeypair {
    secret: [u8; 32],
    #[zeroize(skip)]
    public: ExchangePublicKey,
}

impl ExchangeKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::from_secret(secret)
    }

    /// Create from raw 32-byte secret material.
    pub fn from_secret(secret: [u8; 32]) -> Self {
        let scalar = Scalar::from_bytes_mod_order(secret);
        let public = MontgomeryPoint::mul_base(&scalar);
        Self {
            secret,
            public: ExchangePublicKey::from_bytes(*public.as_bytes()),
        }
    }

    /// The public key to submit with an access request.
    pub fn public(&self) -> &ExchangePublicKey {
        &self.public
    }
}

impl std::fmt::Debug for ExchangeKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ExchangeKeypair(public: {:?})", self.public)
    }
}

/// Capability for sealing a batch master key to one observer and opening
/// it again.
///
/// Injected wherever key escrow happens so the ledger and client logic
/// stay independent of the concrete primitive.
pub trait KeySealer: Send + Sync {
    /// Seal a master key to a recipient's exchange public key.
    fn seal(
        &self,
        master_key: &MasterKey,
        recipient: &ExchangePublicKey,
    ) -> Result<SealedMasterKey, SealError>;

    /// Open a sealed master key with the recipient's keypair.
    fn open(
        &self,
        sealed: &SealedMasterKey,
        keypair: &ExchangeKeypair,
    ) -> Result<MasterKey, SealError>;
}

/// X25519 + HKDF-SHA256 + ChaCha20-Poly1305 sealer.
///
/// Sealed layout: ephemeral public key (32B), nonce (12B), then the AEAD
/// ciphertext (key + 16B tag). A fresh ephemeral keypair per seal means
/// two sealed copies of the same master key share no key material.
#[derive(Debug, Default, Clone, Copy)]
pub struct X25519Sealer;

impl KeySealer for X25519Sealer {
    fn seal(
        &self,
        master_key: &MasterKey,
        recipient: &ExchangePublicKey,
    ) -> Result<SealedMasterKey, SealError> {
        let mut ephemeral_secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut ephemeral_secret);
        let ephemeral_scalar = Scalar::from_bytes_mod_order(ephemeral_secret);
        let ephemeral_public = MontgomeryPoint::mul_base(&ephemeral_scalar);

        let recipient_point = MontgomeryPoint(*recipient.as_bytes());
        let shared_secret = ephemeral_scalar * recipient_point;

        let symmetric_key = derive_key(
            shared_secret.as_bytes(),
            ephemeral_public.as_bytes(),
            recipient.as_bytes(),
        )?;

        let mut nonce = [0u8; NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut nonce);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&symmetric_key));
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), master_key.as_bytes().as_slice())
            .map_err(|_| SealError::Encryption)?;

        let mut sealed = Vec::with_capacity(EPHEMERAL_PK_SIZE + NONCE_SIZE + ciphertext.len());
        sealed.extend_from_slice(ephemeral_public.as_bytes());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(SealedMasterKey::from_bytes(sealed))
    }

    fn open(
        &self,
        sealed: &SealedMasterKey,
        keypair: &ExchangeKeypair,
    ) -> Result<MasterKey, SealError> {
        let bytes = sealed.as_bytes();
        if bytes.len() < EPHEMERAL_PK_SIZE + NONCE_SIZE + AUTH_TAG_SIZE {
            return Err(SealError::MalformedCiphertext {
                len: bytes.len(),
            });
        }

        let mut ephemeral_public = [0u8; EPHEMERAL_PK_SIZE];
        ephemeral_public.copy_from_slice(&bytes[..EPHEMERAL_PK_SIZE]);
        let nonce = &bytes[EPHEMERAL_PK_SIZE..EPHEMERAL_PK_SIZE + NONCE_SIZE];
        let ciphertext = &bytes[EPHEMERAL_PK_SIZE + NONCE_SIZE..];

        let our_scalar = Scalar::from_bytes_mod_order(keypair.secret);
        let ephemeral_point = MontgomeryPoint(ephemeral_public);
        let shared_secret = our_scalar * ephemeral_point;

        let symmetric_key = derive_key(
            shared_secret.as_bytes(),
            &ephemeral_public,
            keypair.public.as_bytes(),
        )?;

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&symmetric_key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SealError::Decryption)?;

        let key: [u8; MASTER_KEY_SIZE] =
            plaintext
                .try_into()
                .map_err(|v: Vec<u8>| SealError::MalformedCiphertext { len: v.len() })?;
        Ok(MasterKey::from_bytes(key))
    }
}

/// Derive the AEAD key from the X25519 shared secret.
///
/// Both public keys go into the HKDF info so a sealed key is bound to this
/// exact (ephemeral, recipient) pair.
fn derive_key(
    shared_secret: &[u8; 32],
    ephemeral_public: &[u8; 32],
    recipient_public: &[u8; 32],
) -> Result<[u8; 32], SealError> {
    let mut info = Vec::with_capacity(64);
    info.extend_from_slice(ephemeral_public);
    info.extend_from_slice(recipient_public);

    let hkdf = Hkdf::<Sha256>::new(Some(SEAL_DOMAIN), shared_secret);
    let mut output = [0u8; 32];
    hkdf.expand(&info, &mut output)
        .map_err(|_| SealError::KeyDerivation)?;
    Ok(output)
}

/// Errors from key-escrow sealing operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SealError {
    #[error("sealing failed")]
    Encryption,
    #[error("sealed key could not be opened")]
    Decryption,
    #[error("malformed sealed ciphertext ({len} bytes)")]
    MalformedCiphertext { len: usize },
    #[error("key derivation failed")]
    KeyDerivation,
}
