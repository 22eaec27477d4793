use seatrace_crypto::{SealError, SignedError};
use seatrace_ledger::LedgerError;
use seatrace_types::{AccountAddress, PublicId};

/// Errors surfaced by the client workflows.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error("ledger rejected the request: {0}")]
    Ledger(#[from] LedgerError),

    #[error("request signing failed: {0}")]
    Signing(#[from] SignedError),

    #[error("key escrow failure: {0}")]
    Seal(#[from] SealError),

    #[error("account not found: {address}")]
    AccountNotFound { address: AccountAddress },

    #[error("no master key held for data account {address}")]
    NoMasterKey { address: AccountAddress },

    #[error("observer {observer} has no pending request on this batch")]
    NotRequested { observer: PublicId },

    #[error("observer {observer} is not approved on this batch")]
    NotApproved { observer: PublicId },

    #[error("no fingerprint record at index {index}")]
    NoSuchRecord { index: usize },

    #[error("client key store lock poisoned")]
    LockPoisoned,
}
