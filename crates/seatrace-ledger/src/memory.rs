use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use seatrace_crypto::{
    data_account_address, observers_account_address, ship_account_address, Signed,
};
use seatrace_types::{AccountAddress, FingerprintRecord, PublicId};

use crate::accounts::{DataAccount, ShipAccount};
use crate::error::LedgerError;
use crate::escrow::{ApprovedObserver, ExternalObserversAccount};
use crate::events::LedgerEvent;
use crate::requests::{
    AddDataAccount, AddDataFingerprint, AddDataFingerprints, ApproveObserver, InitializeShip,
    ObserverAccessRequest, ReallocateDataAccount,
};
use crate::traits::{DataAccountAddresses, LedgerReader, LedgerWriter};

/// In-memory ledger implementation for tests, local demos, and embedding.
///
/// All state lives behind one `RwLock`; each operation validates
/// everything it needs before the first mutation, so a reader after any
/// committed operation sees fully consistent state. The recognized ship
/// management authority is fixed at construction.
pub struct InMemoryLedger {
    management: PublicId,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    ships: HashMap<AccountAddress, ShipAccount>,
    data: HashMap<AccountAddress, DataAccount>,
    observers: HashMap<AccountAddress, ExternalObserversAccount>,
    events: Vec<LedgerEvent>,
}

impl InMemoryLedger {
    /// Create an empty ledger recognizing `management` as the ship
    /// management authority.
    pub fn new(management: PublicId) -> Self {
        Self {
            management,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// The recognized ship management authority.
    pub fn management(&self) -> PublicId {
        self.management
    }

    /// Audit events in commit order.
    pub fn events(&self) -> Result<Vec<LedgerEvent>, LedgerError> {
        Ok(self.read_state()?.events.clone())
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

fn verify_envelope<T: serde::Serialize>(request: &Signed<T>) -> Result<(), LedgerError> {
    request
        .verify()
        .map_err(|e| LedgerError::InvalidSignature(e.to_string()))
}

impl LedgerWriter for InMemoryLedger {
    fn initialize_ship(
        &self,
        request: &Signed<InitializeShip>,
    ) -> Result<AccountAddress, LedgerError> {
        verify_envelope(request)?;
        let ship = request.payload.ship;
        let (address, _bump) = ship_account_address(&ship)?;

        if request.signer != self.management {
            return Err(LedgerError::UnauthorizedSigner {
                account: address,
                signer: request.signer,
            });
        }

        let mut state = self.write_state()?;
        if state.ships.contains_key(&address) {
            return Err(LedgerError::AccountExists { address });
        }

        state
            .ships
            .insert(address, ShipAccount::new(ship, self.management));
        state.events.push(LedgerEvent::ShipInitialized {
            ship,
            ship_management: self.management,
            ship_account: address,
        });
        tracing::info!(ship = %ship, account = %address.short_hex(), "ship initialized");
        Ok(address)
    }

    fn add_data_account(
        &self,
        request: &Signed<AddDataAccount>,
    ) -> Result<DataAccountAddresses, LedgerError> {
        verify_envelope(request)?;
        let payload = &request.payload;

        let observers = payload.observers.len();
        let exchange_keys = payload.observer_exchange_keys.len();
        let sealed_keys = payload.observer_sealed_keys.len();
        if observers != exchange_keys || observers != sealed_keys {
            return Err(LedgerError::MismatchedSeedLengths {
                observers,
                exchange_keys,
                sealed_keys,
            });
        }

        let (ship_address, _) = ship_account_address(&payload.ship)?;
        if request.signer != payload.ship {
            return Err(LedgerError::UnauthorizedSigner {
                account: ship_address,
                signer: request.signer,
            });
        }

        let mut state = self.write_state()?;
        let ship_account = state
            .ships
            .get(&ship_address)
            .ok_or(LedgerError::AccountNotFound {
                address: ship_address,
            })?;
        if ship_account.ship != request.signer {
            return Err(LedgerError::UnauthorizedSigner {
                account: ship_address,
                signer: request.signer,
            });
        }

        let batch_index = ship_account.next_batch_index();
        let (data_address, _) = data_account_address(&payload.ship, batch_index)?;
        let (observers_address, _) = observers_account_address(&data_address)?;
        if state.data.contains_key(&data_address) {
            return Err(LedgerError::AccountExists {
                address: data_address,
            });
        }

        // All preconditions hold; commit the three linked writes together.
        let seeded = payload
            .observers
            .iter()
            .zip(&payload.observer_exchange_keys)
            .zip(&payload.observer_sealed_keys)
            .map(|((observer, exchange_key), sealed_key)| ApprovedObserver {
                observer: *observer,
                exchange_key: *exchange_key,
                sealed_master_key: sealed_key.clone(),
            })
            .collect();

        state
            .data
            .insert(data_address, DataAccount::new(payload.ship, payload.created_at_ms));
        state
            .observers
            .insert(observers_address, ExternalObserversAccount::seeded(seeded));
        let ship_account = state
            .ships
            .get_mut(&ship_address)
            .ok_or(LedgerError::AccountNotFound {
                address: ship_address,
            })?;
        ship_account.data_accounts.push(data_address);
        ship_account.data_account_created_at.push(payload.created_at_ms);

        state.events.push(LedgerEvent::DataAccountInitialized {
            ship: payload.ship,
            data_account: data_address,
            observers_account: observers_address,
            batch_index,
            created_at_ms: payload.created_at_ms,
        });
        tracing::info!(
            ship = %payload.ship,
            data_account = %data_address.short_hex(),
            batch_index,
            "data account initialized"
        );
        Ok(DataAccountAddresses {
            data_account: data_address,
            observers_account: observers_address,
            batch_index,
        })
    }

    fn add_data_fingerprint(
        &self,
        request: &Signed<AddDataFingerprint>,
    ) -> Result<(), LedgerError> {
        verify_envelope(request)?;
        let payload = &request.payload;

        let mut state = self.write_state()?;
        let account = state
            .data
            .get_mut(&payload.data_account)
            .ok_or(LedgerError::AccountNotFound {
                address: payload.data_account,
            })?;
        if account.ship != request.signer {
            return Err(LedgerError::UnauthorizedSigner {
                account: payload.data_account,
                signer: request.signer,
            });
        }
        account.ensure_capacity(1)?;

        account.fingerprints.push(FingerprintRecord::new(
            payload.fingerprint,
            payload.auth_tag.clone(),
            payload.iv.clone(),
            payload.timestamp_ms,
        ));
        let ship = account.ship;
        state.events.push(LedgerEvent::DataFingerprintAdded {
            ship,
            data_account: payload.data_account,
            fingerprint: payload.fingerprint,
            timestamp_ms: payload.timestamp_ms,
        });
        tracing::debug!(
            data_account = %payload.data_account.short_hex(),
            fingerprint = %payload.fingerprint,
            "fingerprint appended"
        );
        Ok(())
    }

    fn add_multiple_data_fingerprints(
        &self,
        request: &Signed<AddDataFingerprints>,
    ) -> Result<usize, LedgerError> {
        verify_envelope(request)?;
        let payload = &request.payload;

        let fingerprints = payload.fingerprints.len();
        let auth_tags = payload.auth_tags.len();
        let ivs = payload.ivs.len();
        let timestamps = payload.timestamps_ms.len();
        if fingerprints != auth_tags || fingerprints != ivs || fingerprints != timestamps {
            return Err(LedgerError::MismatchedBatchLengths {
                fingerprints,
                auth_tags,
                ivs,
                timestamps,
            });
        }

        let mut state = self.write_state()?;
        let account = state
            .data
            .get_mut(&payload.data_account)
            .ok_or(LedgerError::AccountNotFound {
                address: payload.data_account,
            })?;
        if account.ship != request.signer {
            return Err(LedgerError::UnauthorizedSigner {
                account: payload.data_account,
                signer: request.signer,
            });
        }
        // Capacity for the whole batch up front: all entries land or none.
        account.ensure_capacity(fingerprints)?;

        let records: Vec<FingerprintRecord> = payload
            .fingerprints
            .iter()
            .zip(&payload.auth_tags)
            .zip(&payload.ivs)
            .zip(&payload.timestamps_ms)
            .map(|(((fingerprint, auth_tag), iv), timestamp_ms)| {
                FingerprintRecord::new(*fingerprint, auth_tag.clone(), iv.clone(), *timestamp_ms)
            })
            .collect();
        account.fingerprints.extend(records);
        let ship = account.ship;

        for (fingerprint, timestamp_ms) in
            payload.fingerprints.iter().zip(&payload.timestamps_ms)
        {
            state.events.push(LedgerEvent::DataFingerprintAdded {
                ship,
                data_account: payload.data_account,
                fingerprint: *fingerprint,
                timestamp_ms: *timestamp_ms,
            });
        }
        tracing::debug!(
            data_account = %payload.data_account.short_hex(),
            count = fingerprints,
            "fingerprint batch appended"
        );
        Ok(fingerprints)
    }

    fn reallocate_data_account(
        &self,
        request: &Signed<ReallocateDataAccount>,
    ) -> Result<usize, LedgerError> {
        verify_envelope(request)?;
        let payload = &request.payload;

        let mut state = self.write_state()?;
        let account = state
            .data
            .get_mut(&payload.data_account)
            .ok_or(LedgerError::AccountNotFound {
                address: payload.data_account,
            })?;
        if account.ship != request.signer {
            return Err(LedgerError::UnauthorizedSigner {
                account: payload.data_account,
                signer: request.signer,
            });
        }

        let capacity = account.grow();
        state.events.push(LedgerEvent::DataAccountReallocated {
            data_account: payload.data_account,
            capacity,
        });
        tracing::debug!(
            data_account = %payload.data_account.short_hex(),
            capacity,
            "data account reallocated"
        );
        Ok(capacity)
    }

    fn external_observer_request(
        &self,
        request: &Signed<ObserverAccessRequest>,
    ) -> Result<(), LedgerError> {
        verify_envelope(request)?;
        let payload = &request.payload;
        let observer = request.signer;
        let (observers_address, _) = observers_account_address(&payload.data_account)?;

        let mut state = self.write_state()?;
        if !state.data.contains_key(&payload.data_account) {
            return Err(LedgerError::AccountNotFound {
                address: payload.data_account,
            });
        }
        let account = state
            .observers
            .get_mut(&observers_address)
            .ok_or(LedgerError::AccountNotFound {
                address: observers_address,
            })?;

        account.request(observer, payload.exchange_key)?;
        state.events.push(LedgerEvent::ExternalObserverRequested {
            data_account: payload.data_account,
            observer,
        });
        tracing::info!(
            data_account = %payload.data_account.short_hex(),
            observer = %observer,
            "observer access requested"
        );
        Ok(())
    }

    fn add_external_observer(
        &self,
        request: &Signed<ApproveObserver>,
    ) -> Result<(), LedgerError> {
        verify_envelope(request)?;
        let payload = &request.payload;
        let (observers_address, _) = observers_account_address(&payload.data_account)?;

        let mut state = self.write_state()?;
        let ship = state
            .data
            .get(&payload.data_account)
            .ok_or(LedgerError::AccountNotFound {
                address: payload.data_account,
            })?
            .ship;
        let (ship_address, _) = ship_account_address(&ship)?;
        let ship_management = state
            .ships
            .get(&ship_address)
            .ok_or(LedgerError::AccountNotFound {
                address: ship_address,
            })?
            .ship_management;

        if request.signer != ship_management {
            return Err(LedgerError::UnauthorizedSigner {
                account: observers_address,
                signer: request.signer,
            });
        }

        let account = state
            .observers
            .get_mut(&observers_address)
            .ok_or(LedgerError::AccountNotFound {
                address: observers_address,
            })?;
        account.approve(&payload.observer, payload.sealed_master_key.clone())?;

        state.events.push(LedgerEvent::ExternalObserverAdded {
            data_account: payload.data_account,
            observer: payload.observer,
        });
        tracing::info!(
            data_account = %payload.data_account.short_hex(),
            observer = %payload.observer,
            "observer approved"
        );
        Ok(())
    }
}

impl LedgerReader for InMemoryLedger {
    fn ship_account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<ShipAccount>, LedgerError> {
        Ok(self.read_state()?.ships.get(address).cloned())
    }

    fn data_account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<DataAccount>, LedgerError> {
        Ok(self.read_state()?.data.get(address).cloned())
    }

    fn observers_account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<ExternalObserversAccount>, LedgerError> {
        Ok(self.read_state()?.observers.get(address).cloned())
    }

    fn ships(&self) -> Result<Vec<PublicId>, LedgerError> {
        Ok(self.read_state()?.ships.values().map(|s| s.ship).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{DEFAULT_DATA_CAPACITY, GROW_CHUNK_RECORDS};
    use crate::error::RejectionKind;
    use crate::escrow::ObserverStatus;
    use seatrace_crypto::SigningKey;
    use seatrace_types::{ExchangePublicKey, Fingerprint, SealedMasterKey};

    struct Harness {
        ledger: InMemoryLedger,
        management: SigningKey,
        ship: SigningKey,
        ship_address: AccountAddress,
    }

    fn harness() -> Harness {
        let management = SigningKey::generate();
        let ship = SigningKey::generate();
        let ledger = InMemoryLedger::new(management.public_id());
        let ship_address = ledger
            .initialize_ship(
                &Signed::sign(
                    &management,
                    InitializeShip {
                        ship: ship.public_id(),
                    },
                )
                .unwrap(),
            )
            .unwrap();
        Harness {
            ledger,
            management,
            ship,
            ship_address,
        }
    }

    fn new_batch(h: &Harness, created_at_ms: i64) -> DataAccountAddresses {
        h.ledger
            .add_data_account(
                &Signed::sign(
                    &h.ship,
                    AddDataAccount {
                        ship: h.ship.public_id(),
                        observers: vec![],
                        observer_exchange_keys: vec![],
                        observer_sealed_keys: vec![],
                        created_at_ms,
                    },
                )
                .unwrap(),
            )
            .unwrap()
    }

    fn append_one(h: &Harness, data_account: AccountAddress, n: u8, timestamp_ms: i64) {
        h.ledger
            .add_data_fingerprint(
                &Signed::sign(
                    &h.ship,
                    AddDataFingerprint {
                        data_account,
                        fingerprint: Fingerprint::of_ciphertext(&[n]),
                        auth_tag: vec![n],
                        iv: vec![n],
                        timestamp_ms,
                    },
                )
                .unwrap(),
            )
            .unwrap();
    }

    #[test]
    fn initialize_ship_creates_account_at_derived_address() {
        let h = harness();
        let account = h.ledger.ship_account(&h.ship_address).unwrap().unwrap();
        assert_eq!(account.ship, h.ship.public_id());
        assert_eq!(account.ship_management, h.management.public_id());
        assert_eq!(account.next_batch_index(), 0);
        assert_eq!(h.ledger.ships().unwrap(), vec![h.ship.public_id()]);
    }

    #[test]
    fn duplicate_ship_initialization_is_rejected() {
        let h = harness();
        let err = h
            .ledger
            .initialize_ship(
                &Signed::sign(
                    &h.management,
                    InitializeShip {
                        ship: h.ship.public_id(),
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::AccountExists {
                address: h.ship_address
            }
        );
        assert_eq!(err.kind(), RejectionKind::DuplicateState);
    }

    #[test]
    fn only_management_can_initialize_ships() {
        let h = harness();
        let impostor = SigningKey::generate();
        let err = h
            .ledger
            .initialize_ship(
                &Signed::sign(
                    &impostor,
                    InitializeShip {
                        ship: PublicId::from_bytes([7; 32]),
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedSigner { .. }));
        assert_eq!(err.kind(), RejectionKind::Authorization);
    }

    #[test]
    fn tampered_envelope_is_rejected() {
        let h = harness();
        let mut request = Signed::sign(
            &h.management,
            InitializeShip {
                ship: PublicId::from_bytes([1; 32]),
            },
        )
        .unwrap();
        request.payload.ship = PublicId::from_bytes([2; 32]);
        let err = h.ledger.initialize_ship(&request).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature(_)));
    }

    #[test]
    fn batch_indices_increase_in_call_order() {
        let h = harness();
        let first = new_batch(&h, 1000);
        let second = new_batch(&h, 2000);
        let third = new_batch(&h, 3000);
        assert_eq!(
            (first.batch_index, second.batch_index, third.batch_index),
            (0, 1, 2)
        );
        assert_ne!(first.data_account, second.data_account);

        let ship_account = h.ledger.ship_account(&h.ship_address).unwrap().unwrap();
        assert_eq!(
            ship_account.data_accounts,
            vec![first.data_account, second.data_account, third.data_account]
        );
        assert_eq!(ship_account.data_account_created_at, vec![1000, 2000, 3000]);
    }

    #[test]
    fn data_account_creation_is_linked_atomically() {
        let h = harness();
        let batch = new_batch(&h, 500);

        // All three pieces exist after one committed operation.
        let ship_account = h.ledger.ship_account(&h.ship_address).unwrap().unwrap();
        assert!(ship_account.data_accounts.contains(&batch.data_account));
        let data = h.ledger.data_account(&batch.data_account).unwrap().unwrap();
        assert_eq!(data.ship, h.ship.public_id());
        assert_eq!(data.created_at_ms, 500);
        assert!(h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .is_some());
    }

    #[test]
    fn add_data_account_rejects_non_owner() {
        let h = harness();
        let impostor = SigningKey::generate();
        let err = h
            .ledger
            .add_data_account(
                &Signed::sign(
                    &impostor,
                    AddDataAccount {
                        ship: h.ship.public_id(),
                        observers: vec![],
                        observer_exchange_keys: vec![],
                        observer_sealed_keys: vec![],
                        created_at_ms: 0,
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedSigner { .. }));

        let ship_account = h.ledger.ship_account(&h.ship_address).unwrap().unwrap();
        assert!(ship_account.data_accounts.is_empty());
    }

    #[test]
    fn seeded_observers_start_approved() {
        let h = harness();
        let observer = PublicId::from_bytes([9; 32]);
        let sealed = SealedMasterKey::from_bytes(vec![1; 76]);
        let batch = h
            .ledger
            .add_data_account(
                &Signed::sign(
                    &h.ship,
                    AddDataAccount {
                        ship: h.ship.public_id(),
                        observers: vec![observer],
                        observer_exchange_keys: vec![ExchangePublicKey::from_bytes([8; 32])],
                        observer_sealed_keys: vec![sealed.clone()],
                        created_at_ms: 0,
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let account = h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .unwrap();
        assert_eq!(
            account.status(&observer),
            ObserverStatus::Approved {
                sealed_master_key: sealed
            }
        );
    }

    #[test]
    fn mismatched_observer_seeds_are_rejected() {
        let h = harness();
        let err = h
            .ledger
            .add_data_account(
                &Signed::sign(
                    &h.ship,
                    AddDataAccount {
                        ship: h.ship.public_id(),
                        observers: vec![PublicId::from_bytes([1; 32])],
                        observer_exchange_keys: vec![],
                        observer_sealed_keys: vec![],
                        created_at_ms: 0,
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::MismatchedSeedLengths {
                observers: 1,
                exchange_keys: 0,
                sealed_keys: 0
            }
        );
        assert_eq!(err.kind(), RejectionKind::MalformedInput);
    }

    #[test]
    fn fingerprints_append_in_order() {
        // Single append at t=1000, then a batch [F2, F3] at t=2000, 3000.
        let h = harness();
        let batch = new_batch(&h, 0);
        append_one(&h, batch.data_account, 1, 1000);

        h.ledger
            .add_multiple_data_fingerprints(
                &Signed::sign(
                    &h.ship,
                    AddDataFingerprints {
                        data_account: batch.data_account,
                        fingerprints: vec![
                            Fingerprint::of_ciphertext(&[2]),
                            Fingerprint::of_ciphertext(&[3]),
                        ],
                        auth_tags: vec![vec![2], vec![3]],
                        ivs: vec![vec![2], vec![3]],
                        timestamps_ms: vec![2000, 3000],
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let account = h.ledger.data_account(&batch.data_account).unwrap().unwrap();
        let fingerprints: Vec<Fingerprint> =
            account.fingerprints.iter().map(|r| r.fingerprint).collect();
        assert_eq!(
            fingerprints,
            vec![
                Fingerprint::of_ciphertext(&[1]),
                Fingerprint::of_ciphertext(&[2]),
                Fingerprint::of_ciphertext(&[3]),
            ]
        );
        let timestamps: Vec<i64> = account.fingerprints.iter().map(|r| r.timestamp_ms).collect();
        assert_eq!(timestamps, vec![1000, 2000, 3000]);
    }

    #[test]
    fn appends_preserve_existing_prefix() {
        let h = harness();
        let batch = new_batch(&h, 0);
        append_one(&h, batch.data_account, 1, 1);
        append_one(&h, batch.data_account, 2, 2);

        let before = h
            .ledger
            .data_account(&batch.data_account)
            .unwrap()
            .unwrap()
            .fingerprints;
        append_one(&h, batch.data_account, 3, 3);
        let after = h
            .ledger
            .data_account(&batch.data_account)
            .unwrap()
            .unwrap()
            .fingerprints;

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(&after[..before.len()], &before[..]);
    }

    #[test]
    fn non_owner_cannot_append() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let impostor = SigningKey::generate();
        let err = h
            .ledger
            .add_data_fingerprint(
                &Signed::sign(
                    &impostor,
                    AddDataFingerprint {
                        data_account: batch.data_account,
                        fingerprint: Fingerprint::of_ciphertext(&[1]),
                        auth_tag: vec![],
                        iv: vec![],
                        timestamp_ms: 0,
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedSigner { .. }));

        let account = h.ledger.data_account(&batch.data_account).unwrap().unwrap();
        assert!(account.fingerprints.is_empty());
    }

    #[test]
    fn mismatched_batch_lengths_append_nothing() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let err = h
            .ledger
            .add_multiple_data_fingerprints(
                &Signed::sign(
                    &h.ship,
                    AddDataFingerprints {
                        data_account: batch.data_account,
                        fingerprints: vec![
                            Fingerprint::of_ciphertext(&[1]),
                            Fingerprint::of_ciphertext(&[2]),
                        ],
                        auth_tags: vec![vec![1], vec![2]],
                        ivs: vec![vec![1]],
                        timestamps_ms: vec![1, 2],
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::MismatchedBatchLengths {
                fingerprints: 2,
                auth_tags: 2,
                ivs: 1,
                timestamps: 2
            }
        );

        let account = h.ledger.data_account(&batch.data_account).unwrap().unwrap();
        assert!(account.fingerprints.is_empty());
    }

    #[test]
    fn batch_overflowing_capacity_appends_nothing() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let n = DEFAULT_DATA_CAPACITY + 1;
        let err = h
            .ledger
            .add_multiple_data_fingerprints(
                &Signed::sign(
                    &h.ship,
                    AddDataFingerprints {
                        data_account: batch.data_account,
                        fingerprints: vec![Fingerprint::of_ciphertext(&[1]); n],
                        auth_tags: vec![vec![]; n],
                        ivs: vec![vec![]; n],
                        timestamps_ms: vec![0; n],
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientCapacity {
                needed: n,
                capacity: DEFAULT_DATA_CAPACITY
            }
        );

        let account = h.ledger.data_account(&batch.data_account).unwrap().unwrap();
        assert!(account.fingerprints.is_empty());
    }

    #[test]
    fn reallocation_unlocks_further_appends() {
        let h = harness();
        let batch = new_batch(&h, 0);

        // Fill the default capacity exactly.
        let n = DEFAULT_DATA_CAPACITY;
        h.ledger
            .add_multiple_data_fingerprints(
                &Signed::sign(
                    &h.ship,
                    AddDataFingerprints {
                        data_account: batch.data_account,
                        fingerprints: vec![Fingerprint::of_ciphertext(&[1]); n],
                        auth_tags: vec![vec![]; n],
                        ivs: vec![vec![]; n],
                        timestamps_ms: vec![0; n],
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let err = h
            .ledger
            .add_data_fingerprint(
                &Signed::sign(
                    &h.ship,
                    AddDataFingerprint {
                        data_account: batch.data_account,
                        fingerprint: Fingerprint::of_ciphertext(&[2]),
                        auth_tag: vec![],
                        iv: vec![],
                        timestamp_ms: 0,
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::Capacity);

        let capacity = h
            .ledger
            .reallocate_data_account(
                &Signed::sign(
                    &h.ship,
                    ReallocateDataAccount {
                        data_account: batch.data_account,
                    },
                )
                .unwrap(),
            )
            .unwrap();
        assert_eq!(capacity, DEFAULT_DATA_CAPACITY + GROW_CHUNK_RECORDS);

        append_one(&h, batch.data_account, 2, 0);
        let account = h.ledger.data_account(&batch.data_account).unwrap().unwrap();
        assert_eq!(account.fingerprints.len(), n + 1);
    }

    #[test]
    fn observer_request_then_management_approval() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let observer = SigningKey::generate();
        let exchange_key = ExchangePublicKey::from_bytes([5; 32]);

        h.ledger
            .external_observer_request(
                &Signed::sign(
                    &observer,
                    ObserverAccessRequest {
                        data_account: batch.data_account,
                        exchange_key,
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let account = h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .unwrap();
        assert_eq!(
            account.status(&observer.public_id()),
            ObserverStatus::Requested { exchange_key }
        );

        let sealed = SealedMasterKey::from_bytes(vec![7; 76]);
        h.ledger
            .add_external_observer(
                &Signed::sign(
                    &h.management,
                    ApproveObserver {
                        data_account: batch.data_account,
                        observer: observer.public_id(),
                        sealed_master_key: sealed.clone(),
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let account = h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .unwrap();
        assert!(account.pending_observers().is_empty());
        assert_eq!(account.approved_observers(), vec![observer.public_id()]);
        assert_eq!(account.sealed_key_for(&observer.public_id()), Some(&sealed));
    }

    #[test]
    fn ship_cannot_approve_a_requested_observer() {
        // Post-request approval is a management-only operation; the ship
        // participates only by sealing the key off-ledger.
        let h = harness();
        let batch = new_batch(&h, 0);
        let observer = SigningKey::generate();

        h.ledger
            .external_observer_request(
                &Signed::sign(
                    &observer,
                    ObserverAccessRequest {
                        data_account: batch.data_account,
                        exchange_key: ExchangePublicKey::from_bytes([5; 32]),
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let err = h
            .ledger
            .add_external_observer(
                &Signed::sign(
                    &h.ship,
                    ApproveObserver {
                        data_account: batch.data_account,
                        observer: observer.public_id(),
                        sealed_master_key: SealedMasterKey::from_bytes(vec![1; 76]),
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedSigner { .. }));

        let account = h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .unwrap();
        assert_eq!(account.pending_observers(), vec![observer.public_id()]);
        assert!(account.approved_observers().is_empty());
    }

    #[test]
    fn unrelated_signer_cannot_approve() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let observer = SigningKey::generate();
        let impostor = SigningKey::generate();

        h.ledger
            .external_observer_request(
                &Signed::sign(
                    &observer,
                    ObserverAccessRequest {
                        data_account: batch.data_account,
                        exchange_key: ExchangePublicKey::from_bytes([5; 32]),
                    },
                )
                .unwrap(),
            )
            .unwrap();

        let err = h
            .ledger
            .add_external_observer(
                &Signed::sign(
                    &impostor,
                    ApproveObserver {
                        data_account: batch.data_account,
                        observer: observer.public_id(),
                        sealed_master_key: SealedMasterKey::from_bytes(vec![1; 76]),
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnauthorizedSigner { .. }));

        let account = h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .unwrap();
        assert_eq!(account.pending_observers(), vec![observer.public_id()]);
        assert!(account.approved_observers().is_empty());
    }

    #[test]
    fn approving_unknown_observer_leaves_sets_unchanged() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let stranger = PublicId::from_bytes([42; 32]);

        let err = h
            .ledger
            .add_external_observer(
                &Signed::sign(
                    &h.management,
                    ApproveObserver {
                        data_account: batch.data_account,
                        observer: stranger,
                        sealed_master_key: SealedMasterKey::from_bytes(vec![1; 76]),
                    },
                )
                .unwrap(),
            )
            .unwrap_err();
        assert_eq!(err, LedgerError::NoPendingRequest { observer: stranger });
        assert_eq!(err.kind(), RejectionKind::NotFound);

        let account = h
            .ledger
            .observers_account(&batch.observers_account)
            .unwrap()
            .unwrap();
        assert!(account.pending_observers().is_empty());
        assert!(account.approved_observers().is_empty());
    }

    #[test]
    fn duplicate_observer_request_is_rejected() {
        let h = harness();
        let batch = new_batch(&h, 0);
        let observer = SigningKey::generate();
        let request = Signed::sign(
            &observer,
            ObserverAccessRequest {
                data_account: batch.data_account,
                exchange_key: ExchangePublicKey::from_bytes([5; 32]),
            },
        )
        .unwrap();

        h.ledger.external_observer_request(&request).unwrap();
        let err = h.ledger.external_observer_request(&request).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ObserverAlreadyRequested {
                observer: observer.public_id()
            }
        );
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(16))]

            // Random interleavings of single appends, batch appends, and
            // malformed batches: every committed append extends the prior
            // sequence as an exact prefix, and a rejected batch changes
            // nothing.
            #[test]
            fn appends_only_ever_extend_the_sequence(
                ops in proptest::collection::vec((0usize..5, any::<bool>()), 1..8)
            ) {
                let h = harness();
                let batch = new_batch(&h, 0);
                let mut counter = 0u8;

                for (size, malformed) in ops {
                    let before = h
                        .ledger
                        .data_account(&batch.data_account)
                        .unwrap()
                        .unwrap()
                        .fingerprints;

                    let appended = if size == 0 {
                        counter += 1;
                        append_one(&h, batch.data_account, counter, counter as i64);
                        1
                    } else {
                        let mut fingerprints = Vec::with_capacity(size);
                        let mut auth_tags = Vec::with_capacity(size);
                        let mut ivs = Vec::with_capacity(size);
                        let mut timestamps_ms = Vec::with_capacity(size);
                        for _ in 0..size {
                            counter += 1;
                            fingerprints.push(Fingerprint::of_ciphertext(&[counter]));
                            auth_tags.push(vec![counter]);
                            ivs.push(vec![counter]);
                            timestamps_ms.push(counter as i64);
                        }
                        if malformed {
                            ivs.pop();
                        }
                        let result = h.ledger.add_multiple_data_fingerprints(
                            &Signed::sign(
                                &h.ship,
                                AddDataFingerprints {
                                    data_account: batch.data_account,
                                    fingerprints,
                                    auth_tags,
                                    ivs,
                                    timestamps_ms,
                                },
                            )
                            .unwrap(),
                        );
                        if malformed {
                            prop_assert!(result.is_err());
                            0
                        } else {
                            prop_assert_eq!(result.unwrap(), size);
                            size
                        }
                    };

                    let after = h
                        .ledger
                        .data_account(&batch.data_account)
                        .unwrap()
                        .unwrap()
                        .fingerprints;
                    prop_assert_eq!(after.len(), before.len() + appended);
                    prop_assert_eq!(&after[..before.len()], &before[..]);
                }
            }
        }
    }

    #[test]
    fn events_record_the_full_history() {
        let h = harness();
        let batch = new_batch(&h, 100);
        append_one(&h, batch.data_account, 1, 1000);

        let events = h.ledger.events().unwrap();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                "ship_initialized",
                "data_account_initialized",
                "data_fingerprint_added"
            ]
        );
    }
}
