use solana_sdk::{
    account::Account, instruction::InstructionError, program_option::COption,
    program_pack::Pack, pubkey::Pubkey,
};
use spl_token::{
    error::TokenError,
    instruction::TokenInstruction,
    state::{Account as TokenAccount, AccountState, Mint},
};
use storefront_sdk::PROGRAM_ID_SPL_TOKEN;

use super::InvokeContext;

fn token_error(error: TokenError) -> InstructionError {
    InstructionError::Custom(error as u32)
}

fn check_token_owned(account: &Account) -> Result<(), InstructionError> {
    if account.owner != PROGRAM_ID_SPL_TOKEN {
        return Err(InstructionError::IncorrectProgramId);
    }
    Ok(())
}

/// Initialized mint stored at `key`.
pub(crate) fn unpack_mint(ctx: &InvokeContext, key: &Pubkey) -> Result<Mint, InstructionError> {
    let account = ctx
        .account(key)
        .ok_or(InstructionError::UninitializedAccount)?;
    check_token_owned(account)?;
    Mint::unpack(&account.data).map_err(|_| token_error(TokenError::InvalidMint))
}

/// Initialized token account stored at `key`.
pub(crate) fn unpack_token_account(
    ctx: &InvokeContext,
    key: &Pubkey,
) -> Result<TokenAccount, InstructionError> {
    let account = ctx
        .account(key)
        .ok_or(InstructionError::UninitializedAccount)?;
    check_token_owned(account)?;
    TokenAccount::unpack(&account.data).map_err(|_| InstructionError::InvalidAccountData)
}

fn write<T: Pack>(ctx: &mut InvokeContext, key: &Pubkey, state: T) -> Result<(), InstructionError> {
    let account = ctx.account_mut(key)?;
    T::pack(state, &mut account.data).map_err(|_| InstructionError::InvalidAccountData)
}

pub(crate) fn process(ctx: &mut InvokeContext) -> Result<(), InstructionError> {
    let instruction =
        TokenInstruction::unpack(ctx.data()).map_err(|_| InstructionError::InvalidInstructionData)?;
    match instruction {
        TokenInstruction::InitializeMint {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            let mint = ctx.key(0)?;
            initialize_mint(ctx, &mint, decimals, mint_authority, freeze_authority)
        }
        TokenInstruction::InitializeMint2 {
            decimals,
            mint_authority,
            freeze_authority,
        } => {
            let mint = ctx.key(0)?;
            initialize_mint(ctx, &mint, decimals, mint_authority, freeze_authority)
        }
        TokenInstruction::InitializeAccount => {
            let account = ctx.key(0)?;
            let mint = ctx.key(1)?;
            let owner = ctx.key(2)?;
            initialize_account(ctx, &account, &mint, &owner)
        }
        TokenInstruction::InitializeAccount2 { owner } | TokenInstruction::InitializeAccount3 { owner } => {
            let account = ctx.key(0)?;
            let mint = ctx.key(1)?;
            initialize_account(ctx, &account, &mint, &owner)
        }
        TokenInstruction::MintTo { amount } => {
            let mint = ctx.key(0)?;
            let destination = ctx.key(1)?;
            let authority = ctx.signer(2)?;
            mint_to(ctx, &mint, &destination, &authority, amount)
        }
        TokenInstruction::Transfer { amount } => {
            let source = ctx.key(0)?;
            let destination = ctx.key(1)?;
            let authority = ctx.signer(2)?;
            transfer(ctx, &source, &destination, &authority, amount)
        }
        _ => Err(InstructionError::InvalidInstructionData),
    }
}

fn initialize_mint(
    ctx: &mut InvokeContext,
    key: &Pubkey,
    decimals: u8,
    mint_authority: Pubkey,
    freeze_authority: COption<Pubkey>,
) -> Result<(), InstructionError> {
    let account = ctx
        .account(key)
        .ok_or(InstructionError::UninitializedAccount)?;
    check_token_owned(account)?;
    if account.data.len() != Mint::LEN {
        return Err(InstructionError::InvalidAccountData);
    }
    if account.lamports < ctx.rent().minimum_balance(Mint::LEN) {
        return Err(token_error(TokenError::NotRentExempt));
    }
    let current =
        Mint::unpack_unchecked(&account.data).map_err(|_| InstructionError::InvalidAccountData)?;
    if current.is_initialized {
        return Err(token_error(TokenError::AlreadyInUse));
    }
    let mint = Mint {
        mint_authority: COption::Some(mint_authority),
        supply: 0,
        decimals,
        is_initialized: true,
        freeze_authority,
    };
    write(ctx, key, mint)
}

pub(crate) fn initialize_account(
    ctx: &mut InvokeContext,
    key: &Pubkey,
    mint: &Pubkey,
    owner: &Pubkey,
) -> Result<(), InstructionError> {
    let account = ctx
        .account(key)
        .ok_or(InstructionError::UninitializedAccount)?;
    check_token_owned(account)?;
    if account.data.len() != TokenAccount::LEN {
        return Err(InstructionError::InvalidAccountData);
    }
    if account.lamports < ctx.rent().minimum_balance(TokenAccount::LEN) {
        return Err(token_error(TokenError::NotRentExempt));
    }
    let current = TokenAccount::unpack_unchecked(&account.data)
        .map_err(|_| InstructionError::InvalidAccountData)?;
    if current.state != AccountState::Uninitialized {
        return Err(token_error(TokenError::AlreadyInUse));
    }
    unpack_mint(ctx, mint)?;
    let token_account = TokenAccount {
        mint: *mint,
        owner: *owner,
        state: AccountState::Initialized,
        ..TokenAccount::default()
    };
    write(ctx, key, token_account)
}

fn mint_to(
    ctx: &mut InvokeContext,
    mint_key: &Pubkey,
    destination_key: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<(), InstructionError> {
    let mut mint = unpack_mint(ctx, mint_key)?;
    let mut destination = unpack_token_account(ctx, destination_key)?;
    if destination.mint != *mint_key {
        return Err(token_error(TokenError::MintMismatch));
    }
    match mint.mint_authority {
        COption::Some(mint_authority) if mint_authority == *authority => {}
        COption::Some(_) => return Err(token_error(TokenError::OwnerMismatch)),
        COption::None => return Err(token_error(TokenError::FixedSupply)),
    }
    destination.amount = destination
        .amount
        .checked_add(amount)
        .ok_or(token_error(TokenError::Overflow))?;
    mint.supply = mint
        .supply
        .checked_add(amount)
        .ok_or(token_error(TokenError::Overflow))?;
    write(ctx, destination_key, destination)?;
    write(ctx, mint_key, mint)
}

/// Moves `amount` tokens between two accounts of the same mint. `authority`
/// must own `source` and have signed.
pub(crate) fn transfer(
    ctx: &mut InvokeContext,
    source_key: &Pubkey,
    destination_key: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Result<(), InstructionError> {
    let mut source = unpack_token_account(ctx, source_key)?;
    let mut destination = unpack_token_account(ctx, destination_key)?;
    if source.state == AccountState::Frozen || destination.state == AccountState::Frozen {
        return Err(token_error(TokenError::AccountFrozen));
    }
    if source.mint != destination.mint {
        return Err(token_error(TokenError::MintMismatch));
    }
    if source.owner != *authority {
        return Err(token_error(TokenError::OwnerMismatch));
    }
    if source.amount < amount {
        return Err(token_error(TokenError::InsufficientFunds));
    }
    if source_key == destination_key {
        return Ok(());
    }
    source.amount -= amount;
    destination.amount = destination
        .amount
        .checked_add(amount)
        .ok_or(token_error(TokenError::Overflow))?;
    write(ctx, source_key, source)?;
    write(ctx, destination_key, destination)
}

/// Hands mint and freeze authority of `mint_key` to `new_authority`.
pub(crate) fn set_mint_authorities(
    ctx: &mut InvokeContext,
    mint_key: &Pubkey,
    new_authority: &Pubkey,
) -> Result<(), InstructionError> {
    let mut mint = unpack_mint(ctx, mint_key)?;
    mint.mint_authority = COption::Some(*new_authority);
    if mint.freeze_authority.is_some() {
        mint.freeze_authority = COption::Some(*new_authority);
    }
    write(ctx, mint_key, mint)
}
