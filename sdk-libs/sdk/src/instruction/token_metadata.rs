//! Builders for the two token-metadata instructions that turn a supply-one
//! mint into a non-fungible asset.
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use super::{check_len, instruction_data};
use crate::{error::Result, PROGRAM_ID_SPL_TOKEN, PROGRAM_ID_TOKEN_METADATA};

pub const CREATE_MASTER_EDITION_V3_DISCRIMINATOR: u8 = 17;
pub const CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR: u8 = 33;

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub verified: bool,
    pub key: Pubkey,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UseMethod {
    Burn,
    Multiple,
    Single,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum CollectionDetails {
    V1 { size: u64 },
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateMetadataAccountArgsV3 {
    pub data: DataV2,
    pub is_mutable: bool,
    pub collection_details: Option<CollectionDetails>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateMasterEditionArgs {
    pub max_supply: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateMetadataAccountV3Accounts {
    pub metadata: Pubkey,
    pub mint: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub update_authority: Pubkey,
}

pub fn create_metadata_account_v3(
    accounts: &CreateMetadataAccountV3Accounts,
    args: &CreateMetadataAccountArgsV3,
) -> Result<Instruction> {
    check_len("asset name", &args.data.name, MAX_NAME_LENGTH)?;
    check_len("asset symbol", &args.data.symbol, MAX_SYMBOL_LENGTH)?;
    check_len("asset uri", &args.data.uri, MAX_URI_LENGTH)?;

    Ok(Instruction {
        program_id: PROGRAM_ID_TOKEN_METADATA,
        accounts: vec![
            AccountMeta::new(accounts.metadata, false),
            AccountMeta::new_readonly(accounts.mint, false),
            AccountMeta::new_readonly(accounts.mint_authority, true),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new_readonly(accounts.update_authority, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_data(&[CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR], args)?,
    })
}

#[derive(Debug, Clone, Copy)]
pub struct CreateMasterEditionV3Accounts {
    pub edition: Pubkey,
    pub mint: Pubkey,
    pub update_authority: Pubkey,
    pub mint_authority: Pubkey,
    pub payer: Pubkey,
    pub metadata: Pubkey,
}

pub fn create_master_edition_v3(
    accounts: &CreateMasterEditionV3Accounts,
    args: &CreateMasterEditionArgs,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: PROGRAM_ID_TOKEN_METADATA,
        accounts: vec![
            AccountMeta::new(accounts.edition, false),
            AccountMeta::new(accounts.mint, false),
            AccountMeta::new_readonly(accounts.update_authority, true),
            AccountMeta::new_readonly(accounts.mint_authority, true),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new(accounts.metadata, false),
            AccountMeta::new_readonly(PROGRAM_ID_SPL_TOKEN, false),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: instruction_data(&[CREATE_MASTER_EDITION_V3_DISCRIMINATOR], args)?,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::StorefrontSdkError;

    fn data(uri: &str) -> DataV2 {
        DataV2 {
            name: "Dog #0".to_string(),
            symbol: String::new(),
            uri: uri.to_string(),
            seller_fee_basis_points: 500,
            creators: None,
            collection: None,
            uses: None,
        }
    }

    #[test]
    fn test_create_metadata_account_v3_layout() {
        let accounts = CreateMetadataAccountV3Accounts {
            metadata: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            mint_authority: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
            update_authority: Pubkey::new_unique(),
        };
        let args = CreateMetadataAccountArgsV3 {
            data: data("https://arweave.net/0"),
            is_mutable: true,
            collection_details: None,
        };
        let instruction = create_metadata_account_v3(&accounts, &args).unwrap();
        assert_eq!(instruction.data[0], CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR);
        assert_eq!(
            CreateMetadataAccountArgsV3::try_from_slice(&instruction.data[1..]).unwrap(),
            args
        );
    }

    #[test]
    fn test_create_metadata_account_v3_rejects_long_uri() {
        let accounts = CreateMetadataAccountV3Accounts {
            metadata: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            mint_authority: Pubkey::new_unique(),
            payer: Pubkey::new_unique(),
            update_authority: Pubkey::new_unique(),
        };
        let args = CreateMetadataAccountArgsV3 {
            data: data(&"u".repeat(MAX_URI_LENGTH + 1)),
            is_mutable: true,
            collection_details: None,
        };
        assert!(matches!(
            create_metadata_account_v3(&accounts, &args),
            Err(StorefrontSdkError::StringTooLong {
                field: "asset uri",
                ..
            })
        ));
    }
}
