use seatrace_crypto::DeriveError;
use seatrace_types::{AccountAddress, PublicId};

/// Coarse classification of a rejected request.
///
/// Every [`LedgerError`] maps to exactly one kind; callers that only need
/// the rejection category (retry policy, metrics) match on this instead of
/// the full variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Wrong or unverifiable signer for the target account.
    Authorization,
    /// The request would re-create state that already exists.
    DuplicateState,
    /// The request references state that does not exist.
    NotFound,
    /// The append would exceed the funded storage capacity.
    Capacity,
    /// The request arguments are structurally invalid.
    MalformedInput,
    /// Ledger-internal failure (derivation, serialization, lock).
    Internal,
}

/// Errors produced by ledger operations.
///
/// Every error aborts the entire requested operation with no partial state
/// change; there is no automatic retry at this layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("request signature invalid: {0}")]
    InvalidSignature(String),

    #[error("signer {signer} is not authorized for account {account:?}")]
    UnauthorizedSigner {
        account: AccountAddress,
        signer: PublicId,
    },

    #[error("account already exists at {address:?}")]
    AccountExists { address: AccountAddress },

    #[error("no account found at {address:?}")]
    AccountNotFound { address: AccountAddress },

    #[error("observer {observer} already has a pending request")]
    ObserverAlreadyRequested { observer: PublicId },

    #[error("observer {observer} is already approved")]
    ObserverAlreadyApproved { observer: PublicId },

    #[error("no pending request for observer {observer}")]
    NoPendingRequest { observer: PublicId },

    #[error("append of {needed} records exceeds funded capacity {capacity}")]
    InsufficientCapacity { needed: usize, capacity: usize },

    #[error(
        "mismatched batch argument lengths: fingerprints={fingerprints}, \
         auth_tags={auth_tags}, ivs={ivs}, timestamps={timestamps}"
    )]
    MismatchedBatchLengths {
        fingerprints: usize,
        auth_tags: usize,
        ivs: usize,
        timestamps: usize,
    },

    #[error(
        "mismatched observer seed lengths: observers={observers}, \
         exchange_keys={exchange_keys}, sealed_keys={sealed_keys}"
    )]
    MismatchedSeedLengths {
        observers: usize,
        exchange_keys: usize,
        sealed_keys: usize,
    },

    #[error("address derivation failed: {0}")]
    Derivation(#[from] DeriveError),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl LedgerError {
    /// The rejection category for this error.
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::InvalidSignature(_) | Self::UnauthorizedSigner { .. } => {
                RejectionKind::Authorization
            }
            Self::AccountExists { .. }
            | Self::ObserverAlreadyRequested { .. }
            | Self::ObserverAlreadyApproved { .. } => RejectionKind::DuplicateState,
            Self::AccountNotFound { .. } | Self::NoPendingRequest { .. } => RejectionKind::NotFound,
            Self::InsufficientCapacity { .. } => RejectionKind::Capacity,
            Self::MismatchedBatchLengths { .. } | Self::MismatchedSeedLengths { .. } => {
                RejectionKind::MalformedInput
            }
            Self::Derivation(_) | Self::LockPoisoned => RejectionKind::Internal,
        }
    }
}
