use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use seatrace_crypto::{
    observers_account_address, KeySealer, MasterKey, Signed, SigningKey, X25519Sealer,
};
use seatrace_ledger::{
    AddDataAccount, AddDataFingerprint, AddDataFingerprints, DataAccountAddresses,
    LedgerReader, LedgerWriter, ObserverStatus, ReallocateDataAccount,
};
use seatrace_types::{
    AccountAddress, ExchangePublicKey, Fingerprint, PublicId, SealedMasterKey,
};

use crate::error::SdkError;

/// A ciphertext record heading for the ledger, before fingerprinting.
///
/// The ciphertext itself stays off-ledger; only its fingerprint, AEAD
/// tag, and IV are recorded.
#[derive(Clone, Debug)]
pub struct CiphertextRecord {
    pub ciphertext: Vec<u8>,
    pub auth_tag: Vec<u8>,
    pub iv: Vec<u8>,
    pub timestamp_ms: i64,
}

/// Ship-side client.
///
/// Holds the ship signing key and one master key per open batch. The
/// master keys never leave this client unsealed; observers only ever see
/// copies sealed to their own exchange keys.
pub struct ShipClient<L, S = X25519Sealer> {
    ledger: Arc<L>,
    key: SigningKey,
    sealer: S,
    master_keys: Mutex<HashMap<AccountAddress, MasterKey>>,
}

impl<L: LedgerWriter + LedgerReader> ShipClient<L, X25519Sealer> {
    pub fn new(ledger: Arc<L>, key: SigningKey) -> Self {
        Self::with_sealer(ledger, key, X25519Sealer)
    }
}

impl<L: LedgerWriter + LedgerReader, S: KeySealer> ShipClient<L, S> {
    pub fn with_sealer(ledger: Arc<L>, key: SigningKey, sealer: S) -> Self {
        Self {
            ledger,
            key,
            sealer,
            master_keys: Mutex::new(HashMap::new()),
        }
    }

    /// The ship identity.
    pub fn public_id(&self) -> PublicId {
        self.key.public_id()
    }

    /// Open the next data batch.
    ///
    /// Generates a fresh master key, seals it to each seeded observer, and
    /// creates the data account plus its observers account in one ledger
    /// operation. The master key is retained for later approvals.
    pub fn start_batch(
        &self,
        created_at_ms: i64,
        seeded_observers: &[(PublicId, ExchangePublicKey)],
    ) -> Result<DataAccountAddresses, SdkError> {
        let master_key = MasterKey::generate();

        let mut observers = Vec::with_capacity(seeded_observers.len());
        let mut exchange_keys = Vec::with_capacity(seeded_observers.len());
        let mut sealed_keys = Vec::with_capacity(seeded_observers.len());
        for (observer, exchange_key) in seeded_observers {
            observers.push(*observer);
            exchange_keys.push(*exchange_key);
            sealed_keys.push(self.sealer.seal(&master_key, exchange_key)?);
        }

        let request = Signed::sign(
            &self.key,
            AddDataAccount {
                ship: self.key.public_id(),
                observers,
                observer_exchange_keys: exchange_keys,
                observer_sealed_keys: sealed_keys,
                created_at_ms,
            },
        )?;
        let addresses = self.ledger.add_data_account(&request)?;

        self.master_keys
            .lock()
            .map_err(|_| SdkError::LockPoisoned)?
            .insert(addresses.data_account, master_key);
        tracing::info!(
            data_account = %addresses.data_account.short_hex(),
            batch_index = addresses.batch_index,
            "batch opened"
        );
        Ok(addresses)
    }

    /// Record one ciphertext's provenance on a batch.
    pub fn record(
        &self,
        data_account: AccountAddress,
        record: &CiphertextRecord,
    ) -> Result<Fingerprint, SdkError> {
        let fingerprint = Fingerprint::of_ciphertext(&record.ciphertext);
        let request = Signed::sign(
            &self.key,
            AddDataFingerprint {
                data_account,
                fingerprint,
                auth_tag: record.auth_tag.clone(),
                iv: record.iv.clone(),
                timestamp_ms: record.timestamp_ms,
            },
        )?;
        self.ledger.add_data_fingerprint(&request)?;
        Ok(fingerprint)
    }

    /// Record several ciphertexts' provenance in one atomic append.
    pub fn record_batch(
        &self,
        data_account: AccountAddress,
        records: &[CiphertextRecord],
    ) -> Result<Vec<Fingerprint>, SdkError> {
        let fingerprints: Vec<Fingerprint> = records
            .iter()
            .map(|r| Fingerprint::of_ciphertext(&r.ciphertext))
            .collect();
        let request = Signed::sign(
            &self.key,
            AddDataFingerprints {
                data_account,
                fingerprints: fingerprints.clone(),
                auth_tags: records.iter().map(|r| r.auth_tag.clone()).collect(),
                ivs: records.iter().map(|r| r.iv.clone()).collect(),
                timestamps_ms: records.iter().map(|r| r.timestamp_ms).collect(),
            },
        )?;
        self.ledger.add_multiple_data_fingerprints(&request)?;
        Ok(fingerprints)
    }

    /// Grow a batch's record capacity by one chunk. Returns the new
    /// capacity.
    pub fn grow_batch(&self, data_account: AccountAddress) -> Result<usize, SdkError> {
        let request = Signed::sign(&self.key, ReallocateDataAccount { data_account })?;
        Ok(self.ledger.reallocate_data_account(&request)?)
    }

    /// Seal the batch master key to an exchange key, without touching the
    /// ledger. Used when management performs the approval.
    pub fn seal_master_key_for(
        &self,
        data_account: AccountAddress,
        exchange_key: &ExchangePublicKey,
    ) -> Result<SealedMasterKey, SdkError> {
        let keys = self
            .master_keys
            .lock()
            .map_err(|_| SdkError::LockPoisoned)?;
        let master_key = keys.get(&data_account).ok_or(SdkError::NoMasterKey {
            address: data_account,
        })?;
        Ok(self.sealer.seal(master_key, exchange_key)?)
    }

    /// Seal the batch master key for a pending observer.
    ///
    /// Looks up the exchange key the observer submitted with its request
    /// and seals the batch master key to it. Committing the approval is a
    /// management-signed operation; the sealed key produced here is handed
    /// to `ManagementClient::approve_observer`.
    pub fn seal_for_pending(
        &self,
        data_account: AccountAddress,
        observer: PublicId,
    ) -> Result<SealedMasterKey, SdkError> {
        let (observers_address, _) = observers_account_address(&data_account)
            .map_err(seatrace_ledger::LedgerError::from)?;
        let account = self
            .ledger
            .observers_account(&observers_address)?
            .ok_or(SdkError::AccountNotFound {
                address: observers_address,
            })?;
        let ObserverStatus::Requested { exchange_key } = account.status(&observer) else {
            return Err(SdkError::NotRequested { observer });
        };

        self.seal_master_key_for(data_account, &exchange_key)
    }

    /// The master key held for a batch, if this client opened it.
    pub fn master_key_for(
        &self,
        data_account: &AccountAddress,
    ) -> Result<Option<MasterKey>, SdkError> {
        Ok(self
            .master_keys
            .lock()
            .map_err(|_| SdkError::LockPoisoned)?
            .get(data_account)
            .cloned())
    }
}
