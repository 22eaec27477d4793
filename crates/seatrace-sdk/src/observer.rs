use std::sync::Arc;

use seatrace_crypto::{
    observers_account_address, ExchangeKeypair, KeySealer, MasterKey, Signed, SigningKey,
    X25519Sealer,
};
use seatrace_ledger::{
    LedgerReader, LedgerWriter, ObserverAccessRequest, ObserverStatus,
};
use seatrace_types::{AccountAddress, ExchangePublicKey, Fingerprint, PublicId};

use crate::error::SdkError;

/// External-observer client.
///
/// Holds the observer's Ed25519 identity and its X25519 exchange keypair.
/// The exchange public key travels with the access request; after
/// approval, the sealed master key on the ledger opens only with the
/// secret half held here.
pub struct ObserverClient<L, S = X25519Sealer> {
    ledger: Arc<L>,
    key: SigningKey,
    exchange: ExchangeKeypair,
    sealer: S,
}

impl<L: LedgerWriter + LedgerReader> ObserverClient<L, X25519Sealer> {
    pub fn new(ledger: Arc<L>, key: SigningKey, exchange: ExchangeKeypair) -> Self {
        Self::with_sealer(ledger, key, exchange, X25519Sealer)
    }
}

impl<L: LedgerWriter + LedgerReader, S: KeySealer> ObserverClient<L, S> {
    pub fn with_sealer(
        ledger: Arc<L>,
        key: SigningKey,
        exchange: ExchangeKeypair,
        sealer: S,
    ) -> Self {
        Self {
            ledger,
            key,
            exchange,
            sealer,
        }
    }

    /// The observer identity.
    pub fn public_id(&self) -> PublicId {
        self.key.public_id()
    }

    /// The exchange public key submitted with access requests.
    pub fn exchange_public(&self) -> &ExchangePublicKey {
        self.exchange.public()
    }

    /// Request access to a batch's master key.
    pub fn request_access(&self, data_account: AccountAddress) -> Result<(), SdkError> {
        let request = Signed::sign(
            &self.key,
            ObserverAccessRequest {
                data_account,
                exchange_key: *self.exchange.public(),
            },
        )?;
        self.ledger.external_observer_request(&request)?;
        tracing::info!(
            data_account = %data_account.short_hex(),
            "access requested"
        );
        Ok(())
    }

    /// Where this observer stands on a batch.
    pub fn status(&self, data_account: &AccountAddress) -> Result<ObserverStatus, SdkError> {
        let (observers_address, _) = observers_account_address(data_account)
            .map_err(seatrace_ledger::LedgerError::from)?;
        let account = self
            .ledger
            .observers_account(&observers_address)?
            .ok_or(SdkError::AccountNotFound {
                address: observers_address,
            })?;
        Ok(account.status(&self.key.public_id()))
    }

    /// Recover the batch master key after approval.
    pub fn recover_master_key(
        &self,
        data_account: &AccountAddress,
    ) -> Result<MasterKey, SdkError> {
        match self.status(data_account)? {
            ObserverStatus::Approved { sealed_master_key } => {
                Ok(self.sealer.open(&sealed_master_key, &self.exchange)?)
            }
            _ => Err(SdkError::NotApproved {
                observer: self.key.public_id(),
            }),
        }
    }

    /// Check a ciphertext against the fingerprint recorded at `index`.
    ///
    /// This is the provenance check: a true result means exactly these
    /// ciphertext bytes were fingerprinted on the ledger at that position.
    pub fn verify_ciphertext(
        &self,
        data_account: &AccountAddress,
        index: usize,
        ciphertext: &[u8],
    ) -> Result<bool, SdkError> {
        let account = self
            .ledger
            .data_account(data_account)?
            .ok_or(SdkError::AccountNotFound {
                address: *data_account,
            })?;
        let record = account
            .fingerprints
            .get(index)
            .ok_or(SdkError::NoSuchRecord { index })?;
        Ok(record.fingerprint == Fingerprint::of_ciphertext(ciphertext))
    }
}
