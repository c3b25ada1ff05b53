use solana_sdk::{instruction::InstructionError, program_pack::Pack};
use spl_token::state::Account as TokenAccount;
use storefront_sdk::{
    address::find_associated_token_address, instruction::associated_token::CREATE_DISCRIMINATOR,
    PROGRAM_ID_SPL_TOKEN,
};

use super::{token, InvokeContext};

pub(crate) fn process(ctx: &mut InvokeContext) -> Result<(), InstructionError> {
    // An empty payload is the legacy encoding of `Create`.
    match ctx.data().first() {
        None | Some(&CREATE_DISCRIMINATOR) => {}
        Some(_) => return Err(InstructionError::InvalidInstructionData),
    }
    let payer = ctx.signer(0)?;
    let associated_token = ctx.key(1)?;
    let wallet = ctx.key(2)?;
    let mint = ctx.key(3)?;

    let expected = find_associated_token_address(&wallet, &mint)
        .map_err(|_| InstructionError::InvalidSeeds)?;
    if expected.address != associated_token {
        return Err(InstructionError::InvalidSeeds);
    }
    ctx.allocate_rent_exempt(
        &payer,
        &associated_token,
        TokenAccount::LEN,
        &PROGRAM_ID_SPL_TOKEN,
    )?;
    token::initialize_account(ctx, &associated_token, &mint, &wallet)
}
