//! Foundation types for Seatrace.
//!
//! Seatrace records tamper-evident fingerprints of encrypted telemetry
//! batches produced by autonomous vessels, and escrows per-observer copies
//! of the symmetric key protecting each batch. This crate provides the
//! identity, addressing, and record types shared by every other Seatrace
//! crate.
//!
//! # Key Types
//!
//! - [`PublicId`] — 32-byte signer identity (ship, observer, or management)
//! - [`AccountAddress`] — deterministically derived storage address
//! - [`Fingerprint`] — 32-byte content digest of a batch's ciphertext
//! - [`FingerprintRecord`] — one append-only ledger entry
//! - [`ExchangePublicKey`] — an observer's X25519 public key
//! - [`SealedMasterKey`] — a batch master key sealed to one observer

pub mod address;
pub mod error;
pub mod escrow;
pub mod identity;
pub mod record;

pub use address::AccountAddress;
pub use error::TypeError;
pub use escrow::{ExchangePublicKey, SealedMasterKey};
pub use identity::PublicId;
pub use record::{Fingerprint, FingerprintRecord};
