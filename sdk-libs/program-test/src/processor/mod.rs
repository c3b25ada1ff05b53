mod associated_token;
mod fixed_price_sale;
mod system;
pub(crate) mod token;
mod token_metadata;

use std::collections::HashMap;

use solana_sdk::{
    account::Account,
    instruction::{AccountMeta, InstructionError},
    pubkey::Pubkey,
    rent::Rent,
    system_instruction::SystemError,
    system_program,
};
use storefront_sdk::{
    PROGRAM_ID_ASSOCIATED_TOKEN, PROGRAM_ID_FIXED_PRICE_SALE, PROGRAM_ID_SPL_TOKEN,
    PROGRAM_ID_TOKEN_METADATA,
};

/// Upper bound on a single allocation, same as the runtime.
const MAX_PERMITTED_DATA_LENGTH: u64 = 10 * 1024 * 1024;

/// State one instruction executes against.
pub(crate) struct InvokeContext<'a> {
    accounts: &'a mut HashMap<Pubkey, Account>,
    metas: Vec<AccountMeta>,
    data: &'a [u8],
    rent: Rent,
}

impl<'a> InvokeContext<'a> {
    pub fn new(
        accounts: &'a mut HashMap<Pubkey, Account>,
        metas: Vec<AccountMeta>,
        data: &'a [u8],
        rent: Rent,
    ) -> Self {
        Self {
            accounts,
            metas,
            data,
            rent,
        }
    }

    pub fn data(&self) -> &[u8] {
        self.data
    }

    pub fn rent(&self) -> &Rent {
        &self.rent
    }

    fn meta(&self, index: usize) -> Result<&AccountMeta, InstructionError> {
        self.metas
            .get(index)
            .ok_or(InstructionError::NotEnoughAccountKeys)
    }

    pub fn key(&self, index: usize) -> Result<Pubkey, InstructionError> {
        Ok(self.meta(index)?.pubkey)
    }

    pub fn is_signer(&self, index: usize) -> Result<bool, InstructionError> {
        Ok(self.meta(index)?.is_signer)
    }

    /// Key at `index`, which must have signed the transaction.
    pub fn signer(&self, index: usize) -> Result<Pubkey, InstructionError> {
        let meta = self.meta(index)?;
        if !meta.is_signer {
            return Err(InstructionError::MissingRequiredSignature);
        }
        Ok(meta.pubkey)
    }

    /// Live account at `key`. Accounts without lamports do not exist.
    pub fn account(&self, key: &Pubkey) -> Option<&Account> {
        self.accounts
            .get(key)
            .filter(|account| account.lamports > 0)
    }

    /// Mutable access, only for accounts passed as writable.
    pub fn account_mut(&mut self, key: &Pubkey) -> Result<&mut Account, InstructionError> {
        if !self
            .metas
            .iter()
            .any(|meta| meta.pubkey == *key && meta.is_writable)
        {
            return Err(InstructionError::ReadonlyDataModified);
        }
        self.accounts
            .get_mut(key)
            .filter(|account| account.lamports > 0)
            .ok_or(InstructionError::UninitializedAccount)
    }

    pub fn transfer_lamports(
        &mut self,
        from: &Pubkey,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<(), InstructionError> {
        let source = self.account_mut(from)?;
        if source.lamports < lamports {
            return Err(InstructionError::Custom(
                SystemError::ResultWithNegativeLamports as u32,
            ));
        }
        source.lamports -= lamports;
        if !self
            .metas
            .iter()
            .any(|meta| meta.pubkey == *to && meta.is_writable)
        {
            return Err(InstructionError::ReadonlyLamportChange);
        }
        let destination = self.accounts.entry(*to).or_insert_with(|| Account {
            owner: system_program::ID,
            ..Account::default()
        });
        destination.lamports = destination
            .lamports
            .checked_add(lamports)
            .ok_or(InstructionError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Funds `address` with `lamports` from `payer`, allocates `space` zeroed
    /// bytes and assigns it to `owner`. Fails if the address holds any
    /// lamports.
    pub fn allocate(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        lamports: u64,
        space: u64,
        owner: &Pubkey,
    ) -> Result<(), InstructionError> {
        if space > MAX_PERMITTED_DATA_LENGTH {
            return Err(InstructionError::InvalidRealloc);
        }
        if self.account(address).is_some() {
            return Err(InstructionError::Custom(
                SystemError::AccountAlreadyInUse as u32,
            ));
        }
        self.transfer_lamports(payer, address, lamports)?;
        let account = self.account_mut(address)?;
        account.data = vec![0; space as usize];
        account.owner = *owner;
        Ok(())
    }

    /// Same as [`Self::allocate`] with exactly the rent exempt minimum.
    pub fn allocate_rent_exempt(
        &mut self,
        payer: &Pubkey,
        address: &Pubkey,
        space: usize,
        owner: &Pubkey,
    ) -> Result<(), InstructionError> {
        let lamports = self.rent.minimum_balance(space);
        self.allocate(payer, address, lamports, space as u64, owner)
    }
}

/// Executes one instruction of a supported program.
pub(crate) fn process_instruction(
    program_id: &Pubkey,
    ctx: &mut InvokeContext,
) -> Result<(), InstructionError> {
    match *program_id {
        id if id == system_program::ID => system::process(ctx),
        id if id == PROGRAM_ID_SPL_TOKEN => token::process(ctx),
        id if id == PROGRAM_ID_ASSOCIATED_TOKEN => associated_token::process(ctx),
        id if id == PROGRAM_ID_TOKEN_METADATA => token_metadata::process(ctx),
        id if id == PROGRAM_ID_FIXED_PRICE_SALE => fixed_price_sale::process(ctx),
        _ => Err(InstructionError::UnsupportedProgramId),
    }
}
