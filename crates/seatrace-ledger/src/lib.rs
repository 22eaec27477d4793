//! Append-only provenance ledger for Seatrace.
//!
//! This crate is the heart of Seatrace. It provides:
//! - Ship, data, and external-observers account types
//! - The observer key-escrow state machine (`Unrequested → Requested →
//!   Approved`)
//! - Signed request payloads for every operation
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger` reference implementation for tests and embedding
//! - Audit events emitted by every successful mutation
//!
//! Every mutation is fail-atomic: it either commits in full or rejects
//! with a specific [`LedgerError`], leaving no partial state behind.

pub mod accounts;
pub mod error;
pub mod escrow;
pub mod events;
pub mod memory;
pub mod requests;
pub mod traits;

pub use accounts::{DataAccount, ShipAccount, DEFAULT_DATA_CAPACITY, GROW_CHUNK_RECORDS};
pub use error::{LedgerError, RejectionKind};
pub use escrow::{ApprovedObserver, ExternalObserversAccount, ObserverStatus, PendingObserver};
pub use events::LedgerEvent;
pub use memory::InMemoryLedger;
pub use requests::{
    AddDataAccount, AddDataFingerprint, AddDataFingerprints, ApproveObserver,
    InitializeShip, ObserverAccessRequest, ReallocateDataAccount,
};
pub use traits::{DataAccountAddresses, LedgerReader, LedgerWriter};
