use borsh::BorshDeserialize;
use solana_sdk::{instruction::InstructionError, program_option::COption};
use storefront_sdk::{
    address::{find_master_edition_address, find_metadata_address},
    instruction::token_metadata::{
        CreateMasterEditionArgs, CreateMetadataAccountArgsV3,
        CREATE_MASTER_EDITION_V3_DISCRIMINATOR, CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR,
        MAX_SELLER_FEE_BASIS_POINTS,
    },
    state::{MasterEdition, Metadata, MetadataData, MetadataKey, MetadataRecord},
    PROGRAM_ID_TOKEN_METADATA,
};

use super::{token, InvokeContext};

// Token metadata program error codes.
const INVALID_METADATA_KEY: u32 = 5;
const UPDATE_AUTHORITY_INCORRECT: u32 = 7;
const INVALID_MINT_AUTHORITY: u32 = 13;
const EDITIONS_MUST_HAVE_EXACTLY_ONE_TOKEN: u32 = 23;
const INVALID_BASIS_POINTS: u32 = 42;
const MISMATCHED_MINT: u32 = 51;

pub(crate) fn process(ctx: &mut InvokeContext) -> Result<(), InstructionError> {
    let (discriminator, payload) = ctx
        .data()
        .split_first()
        .ok_or(InstructionError::InvalidInstructionData)?;
    match *discriminator {
        CREATE_METADATA_ACCOUNT_V3_DISCRIMINATOR => {
            let args = CreateMetadataAccountArgsV3::try_from_slice(payload)
                .map_err(|_| InstructionError::InvalidInstructionData)?;
            create_metadata_account_v3(ctx, args)
        }
        CREATE_MASTER_EDITION_V3_DISCRIMINATOR => {
            let args = CreateMasterEditionArgs::try_from_slice(payload)
                .map_err(|_| InstructionError::InvalidInstructionData)?;
            create_master_edition_v3(ctx, args)
        }
        _ => Err(InstructionError::InvalidInstructionData),
    }
}

fn create_metadata_account_v3(
    ctx: &mut InvokeContext,
    args: CreateMetadataAccountArgsV3,
) -> Result<(), InstructionError> {
    let metadata = ctx.key(0)?;
    let mint = ctx.key(1)?;
    let mint_authority = ctx.signer(2)?;
    let payer = ctx.signer(3)?;
    let update_authority = ctx.key(4)?;

    let expected = find_metadata_address(&mint).map_err(|_| InstructionError::InvalidSeeds)?;
    if expected.address != metadata {
        return Err(InstructionError::InvalidSeeds);
    }
    let mint_state = token::unpack_mint(ctx, &mint)?;
    if mint_state.mint_authority != COption::Some(mint_authority) {
        return Err(InstructionError::Custom(INVALID_MINT_AUTHORITY));
    }
    if args.data.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
        return Err(InstructionError::Custom(INVALID_BASIS_POINTS));
    }
    // Only the signing creator may be marked verified.
    if let Some(creators) = &args.data.creators {
        for creator in creators.iter().filter(|creator| creator.verified) {
            if creator.address != payer
                && creator.address != update_authority
                && creator.address != mint_authority
            {
                return Err(InstructionError::MissingRequiredSignature);
            }
        }
    }

    ctx.allocate_rent_exempt(&payer, &metadata, Metadata::LEN, &PROGRAM_ID_TOKEN_METADATA)?;
    let record = Metadata {
        key: MetadataKey::MetadataV1,
        update_authority,
        mint,
        data: MetadataData {
            name: args.data.name,
            symbol: args.data.symbol,
            uri: args.data.uri,
            seller_fee_basis_points: args.data.seller_fee_basis_points,
            creators: args.data.creators,
        },
        primary_sale_happened: false,
        is_mutable: args.is_mutable,
        edition_nonce: Some(expected.bump),
        token_standard: None,
        collection: args.data.collection,
        uses: args.data.uses,
        collection_details: args.collection_details,
    };
    let data = record
        .pack()
        .map_err(|_| InstructionError::AccountDataTooSmall)?;
    ctx.account_mut(&metadata)?.data = data;
    Ok(())
}

fn create_master_edition_v3(
    ctx: &mut InvokeContext,
    args: CreateMasterEditionArgs,
) -> Result<(), InstructionError> {
    let edition = ctx.key(0)?;
    let mint = ctx.key(1)?;
    let update_authority = ctx.signer(2)?;
    let mint_authority = ctx.signer(3)?;
    let payer = ctx.signer(4)?;
    let metadata = ctx.key(5)?;

    let expected =
        find_master_edition_address(&mint).map_err(|_| InstructionError::InvalidSeeds)?;
    if expected.address != edition {
        return Err(InstructionError::InvalidSeeds);
    }
    let metadata_account = ctx
        .account(&metadata)
        .ok_or(InstructionError::UninitializedAccount)?;
    if metadata_account.owner != PROGRAM_ID_TOKEN_METADATA {
        return Err(InstructionError::IncorrectProgramId);
    }
    let metadata_record = <Metadata as MetadataRecord>::unpack(&metadata_account.data)
        .map_err(|_| InstructionError::Custom(INVALID_METADATA_KEY))?;
    if metadata_record.mint != mint {
        return Err(InstructionError::Custom(MISMATCHED_MINT));
    }
    if metadata_record.update_authority != update_authority {
        return Err(InstructionError::Custom(UPDATE_AUTHORITY_INCORRECT));
    }
    let mint_state = token::unpack_mint(ctx, &mint)?;
    if mint_state.mint_authority != COption::Some(mint_authority) {
        return Err(InstructionError::Custom(INVALID_MINT_AUTHORITY));
    }
    if mint_state.supply != 1 {
        return Err(InstructionError::Custom(EDITIONS_MUST_HAVE_EXACTLY_ONE_TOKEN));
    }

    ctx.allocate_rent_exempt(&payer, &edition, MasterEdition::LEN, &PROGRAM_ID_TOKEN_METADATA)?;
    let record = MasterEdition {
        key: MetadataKey::MasterEditionV2,
        supply: 0,
        max_supply: args.max_supply,
    };
    let data = MetadataRecord::pack(&record).map_err(|_| InstructionError::AccountDataTooSmall)?;
    ctx.account_mut(&edition)?.data = data;
    // The edition becomes the only authority able to mint, locking supply.
    token::set_mint_authorities(ctx, &mint, &edition)
}
