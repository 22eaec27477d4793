use serde::{Deserialize, Serialize};
use seatrace_types::{AccountAddress, FingerprintRecord, PublicId};

use crate::error::LedgerError;

/// Initial funded record capacity of a new data account.
///
/// Sized for one fingerprint per minute over a four-hour reporting window.
pub const DEFAULT_DATA_CAPACITY: usize = 240;

/// Records added to a data account's capacity by one reallocation step.
pub const GROW_CHUNK_RECORDS: usize = 320;

/// Root account for one ship identity.
///
/// Created once by the ship management authority; never deleted. The
/// ordered list of data account addresses is append-only, and its length
/// defines the next batch index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipAccount {
    /// The ship's public identity (immutable after creation).
    pub ship: PublicId,
    /// The management authority that registered the ship.
    pub ship_management: PublicId,
    /// Addresses of this ship's data accounts, in creation order.
    pub data_accounts: Vec<AccountAddress>,
    /// Starting timestamp of each data account, positionally aligned with
    /// `data_accounts`.
    pub data_account_created_at: Vec<i64>,
}

impl ShipAccount {
    /// Create a new ship account with no data batches.
    pub fn new(ship: PublicId, ship_management: PublicId) -> Self {
        Self {
            ship,
            ship_management,
            data_accounts: Vec::new(),
            data_account_created_at: Vec::new(),
        }
    }

    /// The index the next data account will be created at.
    pub fn next_batch_index(&self) -> u64 {
        self.data_accounts.len() as u64
    }
}

/// One data batch: an append-only sequence of fingerprint records.
///
/// Existing entries are never mutated or removed; entries are written only
/// under the owning ship's signature. The funded `capacity` bounds how
/// many records fit before an explicit reallocation step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataAccount {
    /// Owning ship identity (authorization anchor).
    pub ship: PublicId,
    /// Batch creation timestamp, writer-supplied and immutable.
    pub created_at_ms: i64,
    /// Append-only fingerprint sequence.
    pub fingerprints: Vec<FingerprintRecord>,
    capacity: usize,
}

impl DataAccount {
    /// Create an empty data account at the default funded capacity.
    pub fn new(ship: PublicId, created_at_ms: i64) -> Self {
        Self {
            ship,
            created_at_ms,
            fingerprints: Vec::new(),
            capacity: DEFAULT_DATA_CAPACITY,
        }
    }

    /// The funded record capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records that can still be appended without reallocation.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.fingerprints.len())
    }

    /// Reject unless `additional` more records fit in the funded capacity.
    pub fn ensure_capacity(&self, additional: usize) -> Result<(), LedgerError> {
        let needed = self.fingerprints.len() + additional;
        if needed > self.capacity {
            return Err(LedgerError::InsufficientCapacity {
                needed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Grow the funded capacity by one reallocation chunk.
    ///
    /// Returns the new capacity. Growing an account with spare room is a
    /// valid (if wasteful) request, mirroring a storage realloc that is a
    /// no-op for the append that follows.
    pub fn grow(&mut self) -> usize {
        self.capacity += GROW_CHUNK_RECORDS;
        self.capacity
    }
}
