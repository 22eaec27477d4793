//! Request payloads for every ledger operation.
//!
//! Each payload crosses the ledger boundary inside a
//! `seatrace_crypto::Signed` envelope; the ledger verifies the envelope
//! before checking the signer against the target account's authority.

use serde::{Deserialize, Serialize};
use seatrace_types::{
    AccountAddress, ExchangePublicKey, Fingerprint, PublicId, SealedMasterKey,
};

/// Register a ship. Must be signed by the ship management authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeShip {
    /// The ship identity to register.
    pub ship: PublicId,
}

/// Create the next data batch under a ship, together with its paired
/// external-observers account. Must be signed by the ship itself.
///
/// The three observer vectors seed the new observers account with
/// already-approved entries; they are positionally aligned and must be
/// equal length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDataAccount {
    /// The ship the batch belongs to (must match the signer).
    pub ship: PublicId,
    pub observers: Vec<PublicId>,
    pub observer_exchange_keys: Vec<ExchangePublicKey>,
    pub observer_sealed_keys: Vec<SealedMasterKey>,
    /// Batch starting timestamp, writer-supplied.
    pub created_at_ms: i64,
}

/// Append one fingerprint record. Must be signed by the owning ship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDataFingerprint {
    pub data_account: AccountAddress,
    pub fingerprint: Fingerprint,
    pub auth_tag: Vec<u8>,
    pub iv: Vec<u8>,
    pub timestamp_ms: i64,
}

/// Append several fingerprint records in one atomic step. Must be signed
/// by the owning ship.
///
/// The four vectors are positionally aligned; mismatched lengths reject
/// the whole request with no partial append.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddDataFingerprints {
    pub data_account: AccountAddress,
    pub fingerprints: Vec<Fingerprint>,
    pub auth_tags: Vec<Vec<u8>>,
    pub ivs: Vec<Vec<u8>>,
    pub timestamps_ms: Vec<i64>,
}

/// Grow a data account's funded record capacity by one chunk. Must be
/// signed by the owning ship, which bears the storage cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReallocateDataAccount {
    pub data_account: AccountAddress,
}

/// Ask for access to a batch's master key. Signed by the observer itself;
/// the signer identity becomes the pending observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverAccessRequest {
    pub data_account: AccountAddress,
    /// X25519 public key the master key will be sealed to on approval.
    pub exchange_key: ExchangePublicKey,
}

/// Approve a pending observer, attaching the sealed master key. Must be
/// signed by the ship management authority recorded on the owning ship
/// account; the ship itself only seeds observers at batch creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveObserver {
    pub data_account: AccountAddress,
    pub observer: PublicId,
    /// The batch master key sealed to the observer's exchange key,
    /// produced off-ledger by the batch owner.
    pub sealed_master_key: SealedMasterKey,
}
