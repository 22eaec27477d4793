use serde::{Deserialize, Serialize};
use seatrace_types::{AccountAddress, Fingerprint, PublicId};

/// Audit event recorded by every successful ledger mutation.
///
/// Events carry no secret material; the sealed master key itself is read
/// back from the observers account, not from the event stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ShipInitialized {
        ship: PublicId,
        ship_management: PublicId,
        ship_account: AccountAddress,
    },
    DataAccountInitialized {
        ship: PublicId,
        data_account: AccountAddress,
        observers_account: AccountAddress,
        batch_index: u64,
        created_at_ms: i64,
    },
    DataFingerprintAdded {
        ship: PublicId,
        data_account: AccountAddress,
        fingerprint: Fingerprint,
        timestamp_ms: i64,
    },
    DataAccountReallocated {
        data_account: AccountAddress,
        capacity: usize,
    },
    ExternalObserverRequested {
        data_account: AccountAddress,
        observer: PublicId,
    },
    ExternalObserverAdded {
        data_account: AccountAddress,
        observer: PublicId,
    },
}

impl LedgerEvent {
    /// Short event name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ShipInitialized { .. } => "ship_initialized",
            Self::DataAccountInitialized { .. } => "data_account_initialized",
            Self::DataFingerprintAdded { .. } => "data_fingerprint_added",
            Self::DataAccountReallocated { .. } => "data_account_reallocated",
            Self::ExternalObserverRequested { .. } => "external_observer_requested",
            Self::ExternalObserverAdded { .. } => "external_observer_added",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        let event = LedgerEvent::ShipInitialized {
            ship: PublicId::from_bytes([1; 32]),
            ship_management: PublicId::from_bytes([2; 32]),
            ship_account: AccountAddress::from_raw([3; 32]),
        };
        assert_eq!(event.kind(), "ship_initialized");
    }

    #[test]
    fn serde_roundtrip() {
        let event = LedgerEvent::DataFingerprintAdded {
            ship: PublicId::from_bytes([1; 32]),
            data_account: AccountAddress::from_raw([2; 32]),
            fingerprint: Fingerprint::of_ciphertext(b"batch"),
            timestamp_ms: 1000,
        };
        let json = serde_json::to_string(&event).unwrap();
        let parsed: LedgerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
