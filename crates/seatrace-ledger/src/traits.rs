use seatrace_crypto::Signed;
use seatrace_types::{AccountAddress, PublicId};

use crate::accounts::{DataAccount, ShipAccount};
use crate::error::LedgerError;
use crate::escrow::ExternalObserversAccount;
use crate::requests::{
    AddDataAccount, AddDataFingerprint, AddDataFingerprints, ApproveObserver, InitializeShip,
    ObserverAccessRequest, ReallocateDataAccount,
};

/// Addresses created by a successful `add_data_account`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataAccountAddresses {
    pub data_account: AccountAddress,
    pub observers_account: AccountAddress,
    pub batch_index: u64,
}

/// Write boundary for ledger mutations.
///
/// Every method verifies the signed envelope, checks the signer against
/// the target account's authority, and commits fail-atomically.
pub trait LedgerWriter: Send + Sync {
    /// Register a ship. Management-signed.
    fn initialize_ship(
        &self,
        request: &Signed<InitializeShip>,
    ) -> Result<AccountAddress, LedgerError>;

    /// Create the next data batch and its paired observers account.
    /// Ship-signed.
    fn add_data_account(
        &self,
        request: &Signed<AddDataAccount>,
    ) -> Result<DataAccountAddresses, LedgerError>;

    /// Append one fingerprint record. Ship-signed.
    fn add_data_fingerprint(
        &self,
        request: &Signed<AddDataFingerprint>,
    ) -> Result<(), LedgerError>;

    /// Append several fingerprint records atomically. Ship-signed.
    /// Returns the number of records appended.
    fn add_multiple_data_fingerprints(
        &self,
        request: &Signed<AddDataFingerprints>,
    ) -> Result<usize, LedgerError>;

    /// Grow a data account's funded capacity. Ship-signed. Returns the new
    /// capacity.
    fn reallocate_data_account(
        &self,
        request: &Signed<ReallocateDataAccount>,
    ) -> Result<usize, LedgerError>;

    /// Record an observer access request. Observer-signed.
    fn external_observer_request(
        &self,
        request: &Signed<ObserverAccessRequest>,
    ) -> Result<(), LedgerError>;

    /// Approve a pending observer with its sealed master key.
    /// Management-signed.
    fn add_external_observer(
        &self,
        request: &Signed<ApproveObserver>,
    ) -> Result<(), LedgerError>;
}

/// Read boundary for ledger queries.
///
/// Reads are public: no signature is required to inspect any account.
pub trait LedgerReader: Send + Sync {
    fn ship_account(&self, address: &AccountAddress)
        -> Result<Option<ShipAccount>, LedgerError>;

    fn data_account(&self, address: &AccountAddress)
        -> Result<Option<DataAccount>, LedgerError>;

    fn observers_account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<ExternalObserversAccount>, LedgerError>;

    /// Registered ship identities, in no particular order.
    fn ships(&self) -> Result<Vec<PublicId>, LedgerError>;
}
