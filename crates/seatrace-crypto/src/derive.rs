use curve25519_dalek::edwards::CompressedEdwardsY;
use seatrace_types::{AccountAddress, PublicId};

/// Seed tag for ship accounts.
pub const SHIP_ACCOUNT_TAG: &str = "ship_account";
/// Seed tag for data accounts.
pub const DATA_ACCOUNT_TAG: &str = "data_account";
/// Seed tag for external-observers accounts.
pub const OBSERVERS_ACCOUNT_TAG: &str = "external_observers_account";

/// Domain tag mixed into every address derivation.
const ADDRESS_DOMAIN: &[u8] = b"seatrace-address-v1";

/// Derive a deterministic account address from a tag and ordered seeds.
///
/// The candidate address is a domain-separated BLAKE3 hash over the tag,
/// the seeds in order, and a disambiguation bump byte. Bumps are searched
/// from 255 downward; a candidate is accepted only if it is *not* a valid
/// Ed25519 curve point, so a derived address can never double as a signer
/// identity. Any party holding the same tag and seeds reproduces the same
/// `(address, bump)` pair.
pub fn derive_address(tag: &str, seeds: &[&[u8]]) -> Result<(AccountAddress, u8), DeriveError> {
    for bump in (0..=255u8).rev() {
        let mut hasher = blake3::Hasher::new();
        hasher.update(ADDRESS_DOMAIN);
        hasher.update(b":");
        hasher.update(tag.as_bytes());
        for seed in seeds {
            hasher.update(seed);
        }
        hasher.update(&[bump]);
        let candidate = *hasher.finalize().as_bytes();
        if !is_on_curve(&candidate) {
            return Ok((AccountAddress::from_raw(candidate), bump));
        }
    }
    Err(DeriveError::NoValidBump {
        tag: tag.to_string(),
    })
}

/// Address of the ship account for a ship identity.
pub fn ship_account_address(ship: &PublicId) -> Result<(AccountAddress, u8), DeriveError> {
    derive_address(SHIP_ACCOUNT_TAG, &[ship.as_bytes()])
}

/// Address of the data account at `batch_index` under a ship identity.
pub fn data_account_address(
    ship: &PublicId,
    batch_index: u64,
) -> Result<(AccountAddress, u8), DeriveError> {
    derive_address(
        DATA_ACCOUNT_TAG,
        &[ship.as_bytes(), &batch_index.to_le_bytes()],
    )
}

/// Address of the external-observers account paired with a data account.
pub fn observers_account_address(
    data_account: &AccountAddress,
) -> Result<(AccountAddress, u8), DeriveError> {
    derive_address(OBSERVERS_ACCOUNT_TAG, &[data_account.as_bytes()])
}

fn is_on_curve(bytes: &[u8; 32]) -> bool {
    CompressedEdwardsY(*bytes).decompress().is_some()
}

/// Errors from address derivation.
///
/// Exhausting the bump search space is a fatal configuration error, not a
/// runtime condition: roughly half of all candidates are off-curve, so 256
/// attempts fail with probability around 2^-256.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeriveError {
    #[error("no valid bump found for tag {tag:?}")]
    NoValidBump { tag: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn derivation_is_deterministic() {
        let ship = PublicId::from_bytes([9; 32]);
        let (addr1, bump1) = ship_account_address(&ship).unwrap();
        let (addr2, bump2) = ship_account_address(&ship).unwrap();
        assert_eq!(addr1, addr2);
        assert_eq!(bump1, bump2);
    }

    #[test]
    fn different_ships_different_addresses() {
        let a = ship_account_address(&PublicId::from_bytes([1; 32])).unwrap();
        let b = ship_account_address(&PublicId::from_bytes([2; 32])).unwrap();
        assert_ne!(a.0, b.0);
    }

    #[test]
    fn batch_index_is_part_of_the_seed() {
        let ship = PublicId::from_bytes([3; 32]);
        let batch0 = data_account_address(&ship, 0).unwrap();
        let batch1 = data_account_address(&ship, 1).unwrap();
        assert_ne!(batch0.0, batch1.0);
    }

    #[test]
    fn tags_namespace_the_address_space() {
        // Same seed bytes under different tags must not collide.
        let ship = PublicId::from_bytes([4; 32]);
        let ship_addr = derive_address(SHIP_ACCOUNT_TAG, &[ship.as_bytes()]).unwrap();
        let obs_addr = derive_address(OBSERVERS_ACCOUNT_TAG, &[ship.as_bytes()]).unwrap();
        assert_ne!(ship_addr.0, obs_addr.0);
    }

    #[test]
    fn derived_address_is_off_curve() {
        let ship = PublicId::from_bytes([5; 32]);
        let (addr, _) = ship_account_address(&ship).unwrap();
        assert!(!is_on_curve(addr.as_bytes()));
    }

    #[test]
    fn observers_address_chains_from_data_address() {
        let ship = PublicId::from_bytes([6; 32]);
        let (data_addr, _) = data_account_address(&ship, 0).unwrap();
        let (obs1, _) = observers_account_address(&data_addr).unwrap();
        let (obs2, _) = observers_account_address(&data_addr).unwrap();
        assert_eq!(obs1, obs2);
        assert_ne!(obs1, data_addr);
    }

    proptest! {
        #[test]
        fn derivation_is_pure(seed: [u8; 32], index: u64) {
            let ship = PublicId::from_bytes(seed);
            let a = data_account_address(&ship, index).unwrap();
            let b = data_account_address(&ship, index).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(!is_on_curve(a.0.as_bytes()));
        }
    }
}
