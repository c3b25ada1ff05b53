use solana_program::pubkey::Pubkey;

use crate::{
    error::{Result, StorefrontSdkError},
    EDITION_SEED, METADATA_SEED, PROGRAM_ID_ASSOCIATED_TOKEN, PROGRAM_ID_FIXED_PRICE_SALE,
    PROGRAM_ID_SPL_TOKEN, PROGRAM_ID_TOKEN_METADATA, VAULT_OWNER_SEED,
};

// Program ids used as seeds need a 'static home to be borrowed from.
static TOKEN_METADATA_PROGRAM: Pubkey = PROGRAM_ID_TOKEN_METADATA;
static TOKEN_PROGRAM: Pubkey = PROGRAM_ID_SPL_TOKEN;

/// A program derived address together with the bump that makes it valid.
///
/// The bump has to travel with the address: programs re-derive the address
/// on-chain from the same seeds plus the bump and reject the account if the
/// result differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
}

impl DerivedAddress {
    /// Re-derives the address from `seeds` and the stored bump and checks
    /// that it matches. Anyone holding the seeds can run this check, so it is
    /// how a counterparty confirms an account is the canonical one for its
    /// role.
    pub fn verify(&self, seeds: &[&[u8]], program_id: &Pubkey) -> bool {
        let bump = [self.bump];
        let mut seeds_with_bump = seeds.to_vec();
        seeds_with_bump.push(&bump);
        Pubkey::create_program_address(&seeds_with_bump, program_id)
            .map(|address| address == self.address)
            .unwrap_or(false)
    }
}

/// Derives the canonical address for `seeds` under `program_id`.
///
/// Searches bumps from 255 downwards and returns the first off-curve
/// candidate. Exhausting the range is fatal for the caller.
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<DerivedAddress> {
    Pubkey::try_find_program_address(seeds, program_id)
        .map(|(address, bump)| DerivedAddress { address, bump })
        .ok_or(StorefrontSdkError::NoViableBump {
            program_id: *program_id,
        })
}

pub fn vault_owner_seeds<'a>(mint: &'a Pubkey, store: &'a Pubkey) -> [&'a [u8]; 3] {
    [VAULT_OWNER_SEED, mint.as_ref(), store.as_ref()]
}

/// Authority of the vault that custodies `mint` for `store`.
pub fn find_vault_owner_address(mint: &Pubkey, store: &Pubkey) -> Result<DerivedAddress> {
    derive_address(&vault_owner_seeds(mint, store), &PROGRAM_ID_FIXED_PRICE_SALE)
}

pub fn metadata_seeds(mint: &Pubkey) -> [&[u8]; 3] {
    [
        METADATA_SEED,
        TOKEN_METADATA_PROGRAM.as_ref(),
        mint.as_ref(),
    ]
}

pub fn find_metadata_address(mint: &Pubkey) -> Result<DerivedAddress> {
    derive_address(&metadata_seeds(mint), &PROGRAM_ID_TOKEN_METADATA)
}

pub fn master_edition_seeds(mint: &Pubkey) -> [&[u8]; 4] {
    [
        METADATA_SEED,
        TOKEN_METADATA_PROGRAM.as_ref(),
        mint.as_ref(),
        EDITION_SEED,
    ]
}

pub fn find_master_edition_address(mint: &Pubkey) -> Result<DerivedAddress> {
    derive_address(&master_edition_seeds(mint), &PROGRAM_ID_TOKEN_METADATA)
}

pub fn associated_token_seeds<'a>(wallet: &'a Pubkey, mint: &'a Pubkey) -> [&'a [u8]; 3] {
    [wallet.as_ref(), TOKEN_PROGRAM.as_ref(), mint.as_ref()]
}

pub fn find_associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<DerivedAddress> {
    derive_address(
        &associated_token_seeds(wallet, mint),
        &PROGRAM_ID_ASSOCIATED_TOKEN,
    )
}

#[cfg(test)]
mod test {
    use rand::{Rng, RngCore};

    use super::*;

    fn random_pubkey<R: RngCore>(rng: &mut R) -> Pubkey {
        Pubkey::new_from_array(rng.gen())
    }

    #[test]
    fn test_derive_address_is_deterministic() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let program_id = random_pubkey(&mut rng);
            let num_seeds = rng.gen_range(1..=4);
            let seeds: Vec<Vec<u8>> = (0..num_seeds)
                .map(|_| {
                    let len = rng.gen_range(0..=32);
                    (0..len).map(|_| rng.gen()).collect()
                })
                .collect();
            let seeds: Vec<&[u8]> = seeds.iter().map(|s| s.as_slice()).collect();

            let first = derive_address(&seeds, &program_id).unwrap();
            let second = derive_address(&seeds, &program_id).unwrap();
            assert_eq!(first, second);
            assert!(first.verify(&seeds, &program_id));
            assert!(!first.address.is_on_curve());
        }
    }

    #[test]
    fn test_derive_address_matches_find_program_address() {
        let mint = Pubkey::new_unique();
        let store = Pubkey::new_unique();
        let derived = find_vault_owner_address(&mint, &store).unwrap();
        let (address, bump) = Pubkey::find_program_address(
            &[VAULT_OWNER_SEED, mint.as_ref(), store.as_ref()],
            &PROGRAM_ID_FIXED_PRICE_SALE,
        );
        assert_eq!(derived, DerivedAddress { address, bump });
    }

    #[test]
    fn test_vault_owner_depends_on_store() {
        let mint = Pubkey::new_unique();
        let first = find_vault_owner_address(&mint, &Pubkey::new_unique()).unwrap();
        let second = find_vault_owner_address(&mint, &Pubkey::new_unique()).unwrap();
        assert_ne!(first.address, second.address);
    }

    #[test]
    fn test_verify_rejects_wrong_inputs() {
        let mint = Pubkey::new_unique();
        let store = Pubkey::new_unique();
        let vault_owner = find_vault_owner_address(&mint, &store).unwrap();
        assert!(vault_owner.verify(&vault_owner_seeds(&mint, &store), &PROGRAM_ID_FIXED_PRICE_SALE));

        let other_store = Pubkey::new_unique();
        assert!(!vault_owner.verify(
            &vault_owner_seeds(&mint, &other_store),
            &PROGRAM_ID_FIXED_PRICE_SALE
        ));
        assert!(!vault_owner.verify(
            &vault_owner_seeds(&mint, &store),
            &PROGRAM_ID_TOKEN_METADATA
        ));

        let wrong_bump = DerivedAddress {
            address: vault_owner.address,
            bump: vault_owner.bump.wrapping_sub(1),
        };
        assert!(!wrong_bump.verify(&vault_owner_seeds(&mint, &store), &PROGRAM_ID_FIXED_PRICE_SALE));
    }

    #[test]
    fn test_master_edition_extends_metadata_seeds() {
        let mint = Pubkey::new_unique();
        let metadata = find_metadata_address(&mint).unwrap();
        let master_edition = find_master_edition_address(&mint).unwrap();
        assert_ne!(metadata.address, master_edition.address);
        assert!(master_edition.verify(&master_edition_seeds(&mint), &PROGRAM_ID_TOKEN_METADATA));
    }

    #[test]
    fn test_seed_longer_than_32_bytes_has_no_bump() {
        let seed = [7u8; 33];
        let program_id = Pubkey::new_unique();
        assert_eq!(
            derive_address(&[seed.as_slice()], &program_id),
            Err(StorefrontSdkError::NoViableBump { program_id })
        );
    }
}
