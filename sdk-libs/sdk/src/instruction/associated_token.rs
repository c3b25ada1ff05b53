use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::{
    address::find_associated_token_address, error::Result, PROGRAM_ID_ASSOCIATED_TOKEN,
    PROGRAM_ID_SPL_TOKEN,
};

/// `Create` in the associated-token-account program instruction enum.
pub const CREATE_DISCRIMINATOR: u8 = 0;

/// Creates the canonical token account of `wallet` for `mint`, funded by
/// `payer`. Fails on-chain if the account already exists.
pub fn create_associated_token_account(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction> {
    let associated_token = find_associated_token_address(wallet, mint)?;
    Ok(Instruction {
        program_id: PROGRAM_ID_ASSOCIATED_TOKEN,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(associated_token.address, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(PROGRAM_ID_SPL_TOKEN, false),
        ],
        data: vec![CREATE_DISCRIMINATOR],
    })
}
