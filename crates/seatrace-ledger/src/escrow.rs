use serde::{Deserialize, Serialize};
use seatrace_types::{ExchangePublicKey, PublicId, SealedMasterKey};

use crate::error::LedgerError;

/// An observer whose access request is awaiting approval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingObserver {
    pub observer: PublicId,
    /// X25519 public key submitted with the request; the ship seals the
    /// batch master key to this key at approval time.
    pub exchange_key: ExchangePublicKey,
}

/// An approved observer together with its escrowed master-key copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovedObserver {
    pub observer: PublicId,
    pub exchange_key: ExchangePublicKey,
    /// The batch master key sealed to `exchange_key`. Only this observer's
    /// matching private key can recover it.
    pub sealed_master_key: SealedMasterKey,
}

/// Where one observer stands in the escrow workflow for one batch.
///
/// `Unrequested → Requested → Approved`; approval is terminal (no
/// revocation is modeled).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObserverStatus {
    Unrequested,
    Requested { exchange_key: ExchangePublicKey },
    Approved { sealed_master_key: SealedMasterKey },
}

/// Per-batch escrow state, co-created with its data account.
///
/// An observer identity is in at most one of `pending` / `approved` at any
/// time; every approved entry carries exactly one sealed key. The sealed
/// key lives inside the approved entry, so key/identity alignment is
/// structural rather than positional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalObserversAccount {
    pub pending: Vec<PendingObserver>,
    pub approved: Vec<ApprovedObserver>,
}

impl ExternalObserversAccount {
    /// Create an account with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an account seeded with observers approved at batch creation.
    pub fn seeded(approved: Vec<ApprovedObserver>) -> Self {
        Self {
            pending: Vec::new(),
            approved,
        }
    }

    /// Where `observer` stands in the workflow. Total over all states.
    pub fn status(&self, observer: &PublicId) -> ObserverStatus {
        if let Some(entry) = self.approved.iter().find(|e| e.observer == *observer) {
            return ObserverStatus::Approved {
                sealed_master_key: entry.sealed_master_key.clone(),
            };
        }
        if let Some(entry) = self.pending.iter().find(|e| e.observer == *observer) {
            return ObserverStatus::Requested {
                exchange_key: entry.exchange_key,
            };
        }
        ObserverStatus::Unrequested
    }

    /// Record an access request: `Unrequested → Requested`.
    pub fn request(
        &mut self,
        observer: PublicId,
        exchange_key: ExchangePublicKey,
    ) -> Result<(), LedgerError> {
        match self.status(&observer) {
            ObserverStatus::Requested { .. } => {
                Err(LedgerError::ObserverAlreadyRequested { observer })
            }
            ObserverStatus::Approved { .. } => {
                Err(LedgerError::ObserverAlreadyApproved { observer })
            }
            ObserverStatus::Unrequested => {
                self.pending.push(PendingObserver {
                    observer,
                    exchange_key,
                });
                Ok(())
            }
        }
    }

    /// Approve a pending request: `Requested → Approved`.
    ///
    /// Moves the entry out of `pending`, attaching the sealed master key.
    pub fn approve(
        &mut self,
        observer: &PublicId,
        sealed_master_key: SealedMasterKey,
    ) -> Result<(), LedgerError> {
        if self.approved.iter().any(|e| e.observer == *observer) {
            return Err(LedgerError::ObserverAlreadyApproved {
                observer: *observer,
            });
        }
        let Some(index) = self.pending.iter().position(|e| e.observer == *observer) else {
            return Err(LedgerError::NoPendingRequest {
                observer: *observer,
            });
        };
        let pending = self.pending.remove(index);
        self.approved.push(ApprovedObserver {
            observer: pending.observer,
            exchange_key: pending.exchange_key,
            sealed_master_key,
        });
        Ok(())
    }

    /// The sealed master key for an approved observer, if any.
    pub fn sealed_key_for(&self, observer: &PublicId) -> Option<&SealedMasterKey> {
        self.approved
            .iter()
            .find(|e| e.observer == *observer)
            .map(|e| &e.sealed_master_key)
    }

    /// Identities currently awaiting approval, in request order.
    pub fn pending_observers(&self) -> Vec<PublicId> {
        self.pending.iter().map(|e| e.observer).collect()
    }

    /// Approved identities, in approval order.
    pub fn approved_observers(&self) -> Vec<PublicId> {
        self.approved.iter().map(|e| e.observer).collect()
    }
}
