use std::sync::Arc;

use seatrace_crypto::{ship_account_address, Signed, SigningKey};
use seatrace_ledger::{
    ApproveObserver, InitializeShip, LedgerReader, LedgerWriter, ShipAccount,
};
use seatrace_types::{AccountAddress, PublicId, SealedMasterKey};

use crate::error::SdkError;

/// Fleet-management client.
///
/// Holds the management signing key, so it can register ships and approve
/// observer requests. Approval takes a pre-sealed master key: only the
/// ship holds the key material, so the sealed copy comes from
/// `ShipClient::seal_for_pending`.
pub struct ManagementClient<L> {
    ledger: Arc<L>,
    key: SigningKey,
}

impl<L: LedgerWriter + LedgerReader> ManagementClient<L> {
    pub fn new(ledger: Arc<L>, key: SigningKey) -> Self {
        Self { ledger, key }
    }

    /// The management identity.
    pub fn public_id(&self) -> PublicId {
        self.key.public_id()
    }

    /// Register a ship, creating its ship account.
    pub fn register_ship(&self, ship: PublicId) -> Result<AccountAddress, SdkError> {
        let request = Signed::sign(&self.key, InitializeShip { ship })?;
        let address = self.ledger.initialize_ship(&request)?;
        tracing::info!(ship = %ship, "ship registered");
        Ok(address)
    }

    /// Approve a pending observer on a batch, attaching the sealed master
    /// key produced by the batch's ship.
    pub fn approve_observer(
        &self,
        data_account: AccountAddress,
        observer: PublicId,
        sealed_master_key: SealedMasterKey,
    ) -> Result<(), SdkError> {
        let request = Signed::sign(
            &self.key,
            ApproveObserver {
                data_account,
                observer,
                sealed_master_key,
            },
        )?;
        self.ledger.add_external_observer(&request)?;
        Ok(())
    }

    /// All registered ship identities.
    pub fn registered_ships(&self) -> Result<Vec<PublicId>, SdkError> {
        Ok(self.ledger.ships()?)
    }

    /// A ship's account, if registered.
    pub fn ship_account(&self, ship: &PublicId) -> Result<Option<ShipAccount>, SdkError> {
        let (address, _) = ship_account_address(ship).map_err(seatrace_ledger::LedgerError::from)?;
        Ok(self.ledger.ship_account(&address)?)
    }
}
