use borsh::BorshDeserialize;
use solana_sdk::{account::Account, instruction::InstructionError, pubkey::Pubkey};
use storefront_sdk::{
    address::{master_edition_seeds, vault_owner_seeds, DerivedAddress},
    discriminator::instruction_discriminator,
    instruction::fixed_price_sale::{
        CreateStoreArgs, FixedPriceSaleErrorCode, InitSellingResourceArgs, CREATE_STORE,
        INIT_SELLING_RESOURCE,
    },
    state::{
        AnchorAccount, MasterEdition, MetadataRecord, SellingResource, SellingResourceState,
        Store,
    },
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, PROGRAM_ID_FIXED_PRICE_SALE, PROGRAM_ID_SPL_TOKEN,
    PROGRAM_ID_TOKEN_METADATA,
};

use super::{token, InvokeContext};

// Anchor framework error codes.
const INSTRUCTION_FALLBACK_NOT_FOUND: u32 = 101;
const INSTRUCTION_DID_NOT_DESERIALIZE: u32 = 102;
const CONSTRAINT_HAS_ONE: u32 = 2001;
const CONSTRAINT_SEEDS: u32 = 2006;
const ACCOUNT_DISCRIMINATOR_MISMATCH: u32 = 3002;
const ACCOUNT_DID_NOT_DESERIALIZE: u32 = 3003;
const ACCOUNT_OWNED_BY_WRONG_PROGRAM: u32 = 3007;
const ACCOUNT_NOT_SIGNER: u32 = 3010;
const ACCOUNT_NOT_INITIALIZED: u32 = 3012;

fn program_error(code: FixedPriceSaleErrorCode) -> InstructionError {
    InstructionError::Custom(code.into())
}

pub(crate) fn process(ctx: &mut InvokeContext) -> Result<(), InstructionError> {
    if ctx.data().len() < 8 {
        return Err(InstructionError::Custom(INSTRUCTION_FALLBACK_NOT_FOUND));
    }
    let (discriminator, payload) = ctx.data().split_at(8);
    if discriminator == instruction_discriminator(CREATE_STORE) {
        let args = CreateStoreArgs::try_from_slice(payload)
            .map_err(|_| InstructionError::Custom(INSTRUCTION_DID_NOT_DESERIALIZE))?;
        create_store(ctx, args)
    } else if discriminator == instruction_discriminator(INIT_SELLING_RESOURCE) {
        let args = InitSellingResourceArgs::try_from_slice(payload)
            .map_err(|_| InstructionError::Custom(INSTRUCTION_DID_NOT_DESERIALIZE))?;
        init_selling_resource(ctx, args)
    } else {
        Err(InstructionError::Custom(INSTRUCTION_FALLBACK_NOT_FOUND))
    }
}

/// Account at `key` that must already exist and belong to `owner`.
fn existing<'c>(
    ctx: &'c InvokeContext,
    key: &Pubkey,
    owner: &Pubkey,
) -> Result<&'c Account, InstructionError> {
    let account = ctx
        .account(key)
        .ok_or(InstructionError::Custom(ACCOUNT_NOT_INITIALIZED))?;
    if account.owner != *owner {
        return Err(InstructionError::Custom(ACCOUNT_OWNED_BY_WRONG_PROGRAM));
    }
    Ok(account)
}

fn write_record<T: AnchorAccount>(
    ctx: &mut InvokeContext,
    key: &Pubkey,
    record: &T,
) -> Result<(), InstructionError> {
    let data = record
        .pack()
        .map_err(|_| InstructionError::AccountDataTooSmall)?;
    ctx.account_mut(key)?.data = data;
    Ok(())
}

fn create_store(ctx: &mut InvokeContext, args: CreateStoreArgs) -> Result<(), InstructionError> {
    let admin = ctx.key(0)?;
    let store = ctx.key(1)?;
    if !ctx.is_signer(0)? || !ctx.is_signer(1)? {
        return Err(program_error(FixedPriceSaleErrorCode::NoValidSignerPresent));
    }
    if args.name.len() > NAME_MAX_LEN {
        return Err(program_error(FixedPriceSaleErrorCode::NameIsTooLong));
    }
    if args.description.len() > DESCRIPTION_MAX_LEN {
        return Err(program_error(FixedPriceSaleErrorCode::DescriptionIsTooLong));
    }

    ctx.allocate_rent_exempt(&admin, &store, Store::LEN, &PROGRAM_ID_FIXED_PRICE_SALE)?;
    let record = Store {
        admin,
        name: args.name,
        description: args.description,
    };
    write_record(ctx, &store, &record)
}

fn init_selling_resource(
    ctx: &mut InvokeContext,
    args: InitSellingResourceArgs,
) -> Result<(), InstructionError> {
    let store = ctx.key(0)?;
    let admin = ctx.key(1)?;
    let selling_resource = ctx.key(2)?;
    let selling_resource_owner = ctx.key(3)?;
    let resource_mint = ctx.key(4)?;
    let master_edition = ctx.key(5)?;
    let vault = ctx.key(7)?;
    let owner = ctx.key(8)?;
    let resource_token = ctx.key(9)?;

    if !ctx.is_signer(1)? || !ctx.is_signer(2)? {
        return Err(InstructionError::Custom(ACCOUNT_NOT_SIGNER));
    }

    let store_account = existing(ctx, &store, &PROGRAM_ID_FIXED_PRICE_SALE)?;
    let store_record = Store::unpack(&store_account.data)
        .map_err(|_| InstructionError::Custom(ACCOUNT_DISCRIMINATOR_MISMATCH))?;
    if store_record.admin != admin {
        return Err(InstructionError::Custom(CONSTRAINT_HAS_ONE));
    }

    existing(ctx, &resource_mint, &PROGRAM_ID_SPL_TOKEN)?;
    token::unpack_mint(ctx, &resource_mint)
        .map_err(|_| InstructionError::Custom(ACCOUNT_DID_NOT_DESERIALIZE))?;

    let edition_account = existing(ctx, &master_edition, &PROGRAM_ID_TOKEN_METADATA)?;
    let expected_edition = DerivedAddress {
        address: master_edition,
        bump: args.master_edition_bump,
    };
    if !expected_edition.verify(
        &master_edition_seeds(&resource_mint),
        &PROGRAM_ID_TOKEN_METADATA,
    ) {
        return Err(program_error(FixedPriceSaleErrorCode::DerivedKeyInvalid));
    }
    let edition = <MasterEdition as MetadataRecord>::unpack(&edition_account.data)
        .map_err(|_| InstructionError::Custom(ACCOUNT_DID_NOT_DESERIALIZE))?;

    // The vault has to exist before it can be bound to a listing.
    existing(ctx, &vault, &PROGRAM_ID_SPL_TOKEN)?;
    let vault_state = token::unpack_token_account(ctx, &vault)
        .map_err(|_| InstructionError::Custom(ACCOUNT_DID_NOT_DESERIALIZE))?;
    if vault_state.owner != owner {
        return Err(InstructionError::Custom(CONSTRAINT_HAS_ONE));
    }
    let vault_owner = DerivedAddress {
        address: owner,
        bump: args.vault_owner_bump,
    };
    if !vault_owner.verify(
        &vault_owner_seeds(&resource_mint, &store),
        &PROGRAM_ID_FIXED_PRICE_SALE,
    ) {
        return Err(InstructionError::Custom(CONSTRAINT_SEEDS));
    }

    let max_supply = match edition.max_supply {
        Some(edition_max_supply) => {
            let requested = args.max_supply.ok_or(program_error(
                FixedPriceSaleErrorCode::SupplyIsNotProvided,
            ))?;
            let available = edition_max_supply.saturating_sub(edition.supply);
            if requested > available {
                return Err(program_error(
                    FixedPriceSaleErrorCode::SupplyIsGtThanAvailable,
                ));
            }
            Some(requested)
        }
        None => args.max_supply,
    };

    token::transfer(ctx, &resource_token, &vault, &admin, 1)?;

    ctx.allocate_rent_exempt(
        &admin,
        &selling_resource,
        SellingResource::LEN,
        &PROGRAM_ID_FIXED_PRICE_SALE,
    )?;
    let record = SellingResource {
        store,
        owner: selling_resource_owner,
        resource: resource_mint,
        vault,
        vault_owner: owner,
        supply: 0,
        max_supply,
        state: SellingResourceState::Created,
    };
    write_record(ctx, &selling_resource, &record)
}
