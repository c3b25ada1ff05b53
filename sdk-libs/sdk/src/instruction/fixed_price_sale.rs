use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program, sysvar,
};

use super::{check_len, instruction_data};
use crate::{
    discriminator::instruction_discriminator, error::Result, PROGRAM_ID_FIXED_PRICE_SALE,
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, PROGRAM_ID_SPL_TOKEN,
};

pub const CREATE_STORE: &str = "create_store";
pub const INIT_SELLING_RESOURCE: &str = "init_selling_resource";

/// Custom program errors of the fixed-price-sale program, Anchor numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FixedPriceSaleErrorCode {
    NoValidSignerPresent = 6000,
    StringIsTooLong,
    NameIsTooLong,
    DescriptionIsTooLong,
    SupplyIsGtThanAvailable,
    SupplyIsNotProvided,
    DerivedKeyInvalid,
}

impl From<FixedPriceSaleErrorCode> for u32 {
    fn from(code: FixedPriceSaleErrorCode) -> u32 {
        code as u32
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateStoreArgs {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateStoreAccounts {
    pub admin: Pubkey,
    /// Fresh keypair address, must sign since the program allocates it.
    pub store: Pubkey,
}

pub fn create_store_instruction(
    accounts: &CreateStoreAccounts,
    args: &CreateStoreArgs,
) -> Result<Instruction> {
    check_len("store name", &args.name, NAME_MAX_LEN)?;
    check_len("store description", &args.description, DESCRIPTION_MAX_LEN)?;

    Ok(Instruction {
        program_id: PROGRAM_ID_FIXED_PRICE_SALE,
        accounts: vec![
            AccountMeta::new(accounts.admin, true),
            AccountMeta::new(accounts.store, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_data(&instruction_discriminator(CREATE_STORE), args)?,
    })
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct InitSellingResourceArgs {
    pub master_edition_bump: u8,
    pub vault_owner_bump: u8,
    pub max_supply: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct InitSellingResourceAccounts {
    pub store: Pubkey,
    pub admin: Pubkey,
    pub selling_resource: Pubkey,
    pub selling_resource_owner: Pubkey,
    pub resource_mint: Pubkey,
    pub master_edition: Pubkey,
    pub metadata: Pubkey,
    pub vault: Pubkey,
    /// Vault owner PDA, `["mt_vault", resource_mint, store]`.
    pub owner: Pubkey,
    pub resource_token: Pubkey,
}

pub fn init_selling_resource_instruction(
    accounts: &InitSellingResourceAccounts,
    args: &InitSellingResourceArgs,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: PROGRAM_ID_FIXED_PRICE_SALE,
        accounts: vec![
            AccountMeta::new_readonly(accounts.store, false),
            AccountMeta::new(accounts.admin, true),
            AccountMeta::new(accounts.selling_resource, true),
            AccountMeta::new_readonly(accounts.selling_resource_owner, false),
            AccountMeta::new_readonly(accounts.resource_mint, false),
            AccountMeta::new_readonly(accounts.master_edition, false),
            AccountMeta::new_readonly(accounts.metadata, false),
            AccountMeta::new(accounts.vault, false),
            AccountMeta::new_readonly(accounts.owner, false),
            AccountMeta::new(accounts.resource_token, false),
            AccountMeta::new_readonly(sysvar::rent::ID, false),
            AccountMeta::new_readonly(PROGRAM_ID_SPL_TOKEN, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_data(&instruction_discriminator(INIT_SELLING_RESOURCE), args)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::StorefrontSdkError;

    #[test]
    fn test_create_store_instruction() {
        let accounts = CreateStoreAccounts {
            admin: Pubkey::new_unique(),
            store: Pubkey::new_unique(),
        };
        let args = CreateStoreArgs {
            name: "x".repeat(NAME_MAX_LEN + 1),
            description: String::new(),
        };
        assert_eq!(
            create_store_instruction(&accounts, &args).unwrap_err(),
            StorefrontSdkError::StringTooLong {
                field: "store name",
                len: NAME_MAX_LEN + 1,
                limit: NAME_MAX_LEN,
            }
        );

        let args = CreateStoreArgs {
            name: "Bau Jee di bhatti".to_string(),
            description: "sastay may phastay saaray hastay hastay ::(".to_string(),
        };
        let instruction = create_store_instruction(&accounts, &args).unwrap();
        assert_eq!(instruction.program_id, PROGRAM_ID_FIXED_PRICE_SALE);
        assert!(instruction.accounts[0].is_signer);
        assert!(instruction.accounts[1].is_signer);
        assert_eq!(
            instruction.data[..8],
            instruction_discriminator(CREATE_STORE)
        );
        let decoded = CreateStoreArgs::try_from_slice(&instruction.data[8..]).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn test_init_selling_resource_account_order() {
        let accounts = InitSellingResourceAccounts {
            store: Pubkey::new_unique(),
            admin: Pubkey::new_unique(),
            selling_resource: Pubkey::new_unique(),
            selling_resource_owner: Pubkey::new_unique(),
            resource_mint: Pubkey::new_unique(),
            master_edition: Pubkey::new_unique(),
            metadata: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            owner: Pubkey::new_unique(),
            resource_token: Pubkey::new_unique(),
        };
        let args = InitSellingResourceArgs {
            master_edition_bump: 254,
            vault_owner_bump: 253,
            max_supply: Some(1),
        };
        let instruction = init_selling_resource_instruction(&accounts, &args).unwrap();
        let keys: Vec<Pubkey> = instruction.accounts.iter().map(|meta| meta.pubkey).collect();
        assert_eq!(
            keys[..10],
            [
                accounts.store,
                accounts.admin,
                accounts.selling_resource,
                accounts.selling_resource_owner,
                accounts.resource_mint,
                accounts.master_edition,
                accounts.metadata,
                accounts.vault,
                accounts.owner,
                accounts.resource_token,
            ]
        );
        assert_eq!(
            InitSellingResourceArgs::try_from_slice(&instruction.data[8..]).unwrap(),
            args
        );
    }
}
