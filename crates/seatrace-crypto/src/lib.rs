//! Cryptographic primitives for Seatrace.
//!
//! Everything the ledger consumes as a cryptographic capability lives
//! here, behind small seams so the ledger logic is testable independent of
//! the chosen primitives:
//!
//! - [`SigningKey`] / [`VerifyingKey`] — Ed25519 signer identities
//! - [`Signed`] — a request payload bound to its signer by signature
//! - [`derive_address`] — deterministic, bump-disambiguated account
//!   derivation guaranteed never to collide with a signer identity
//! - [`KeySealer`] / [`X25519Sealer`] — per-observer master-key escrow
//!   (X25519 agreement, HKDF-SHA256, ChaCha20-Poly1305)

pub mod derive;
pub mod sealer;
pub mod signed;
pub mod signer;

pub use derive::{
    data_account_address, derive_address, observers_account_address, ship_account_address,
    DeriveError, DATA_ACCOUNT_TAG, OBSERVERS_ACCOUNT_TAG, SHIP_ACCOUNT_TAG,
};
pub use sealer::{ExchangeKeypair, KeySealer, MasterKey, SealError, X25519Sealer};
pub use signed::{Signed, SignedError};
pub use signer::{Signature, SignatureError, SigningKey, VerifyingKey};
