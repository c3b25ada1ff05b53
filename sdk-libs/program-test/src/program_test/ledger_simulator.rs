use std::{
    collections::{HashMap, VecDeque},
    fmt::{self, Debug, Formatter},
};

use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::AccountMeta,
    message::Message,
    program_pack::Pack,
    pubkey::Pubkey,
    rent::Rent,
    signature::Signature,
    system_program,
    transaction::{self, Transaction, TransactionError},
};
use spl_token::state::{Account as TokenAccount, Mint};
use tracing::debug;

use crate::{
    processor::{process_instruction, InvokeContext},
    program_test::config::LedgerSimulatorConfig,
};

/// A single node ledger kept in memory. Every accepted transaction is final
/// at once, so any commitment level is reached on confirmation.
pub struct LedgerSimulator {
    accounts: HashMap<Pubkey, Account>,
    recent_blockhashes: VecDeque<Hash>,
    statuses: HashMap<Signature, transaction::Result<()>>,
    rent: Rent,
    config: LedgerSimulatorConfig,
    transaction_count: u64,
}

impl Debug for LedgerSimulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerSimulator")
            .field("accounts", &self.accounts.len())
            .field("transaction_count", &self.transaction_count)
            .finish()
    }
}

impl Default for LedgerSimulator {
    fn default() -> Self {
        Self::with_config(LedgerSimulatorConfig::default())
    }
}

impl LedgerSimulator {
    pub fn with_config(config: LedgerSimulatorConfig) -> Self {
        let mut simulator = Self {
            accounts: HashMap::new(),
            recent_blockhashes: VecDeque::new(),
            statuses: HashMap::new(),
            rent: Rent::default(),
            config,
            transaction_count: 0,
        };
        simulator.advance_blockhash();
        simulator
    }

    pub fn config(&self) -> &LedgerSimulatorConfig {
        &self.config
    }

    pub fn rent(&self) -> &Rent {
        &self.rent
    }

    /// Number of transactions that paid fees, failed ones included.
    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    pub fn set_account(&mut self, address: Pubkey, account: Account) {
        self.accounts.insert(address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<&Account> {
        self.accounts
            .get(address)
            .filter(|account| account.lamports > 0)
    }

    /// Accounts that currently hold lamports.
    pub fn account_count(&self) -> usize {
        self.accounts
            .values()
            .filter(|account| account.lamports > 0)
            .count()
    }

    pub fn token_account(&self, address: &Pubkey) -> Option<TokenAccount> {
        self.account(address)
            .filter(|account| account.owner == spl_token::id())
            .and_then(|account| TokenAccount::unpack(&account.data).ok())
    }

    pub fn mint(&self, address: &Pubkey) -> Option<Mint> {
        self.account(address)
            .filter(|account| account.owner == spl_token::id())
            .and_then(|account| Mint::unpack(&account.data).ok())
    }

    pub fn signature_status(&self, signature: &Signature) -> Option<&transaction::Result<()>> {
        self.statuses.get(signature)
    }

    /// Invalidates every issued blockhash, as if they all aged out.
    pub fn expire_blockhashes(&mut self) {
        self.recent_blockhashes.clear();
        self.advance_blockhash();
    }

    pub fn set_airdrops_land(&mut self, airdrops_land: bool) {
        self.config.airdrops_land = airdrops_land;
    }

    pub(crate) fn advance_blockhash(&mut self) -> Hash {
        let blockhash = Hash::new_unique();
        self.recent_blockhashes.push_back(blockhash);
        while self.recent_blockhashes.len() > self.config.max_recent_blockhashes.max(1) {
            self.recent_blockhashes.pop_front();
        }
        blockhash
    }

    pub(crate) fn airdrop(&mut self, to: &Pubkey, lamports: u64) -> Signature {
        let signature = Signature::new_unique();
        if self.config.airdrops_land {
            let account = self.accounts.entry(*to).or_insert_with(|| Account {
                owner: system_program::ID,
                ..Account::default()
            });
            account.lamports = account.lamports.saturating_add(lamports);
            self.statuses.insert(signature, Ok(()));
        }
        debug!("airdrop {} lamports to {}: {}", lamports, to, signature);
        signature
    }

    /// Runs `transaction` through the same gates as a validator: recent
    /// blockhash, signatures, duplicate detection and fee payment, then the
    /// instructions against a copy of the state that is only committed if
    /// all of them succeed.
    pub(crate) fn execute_transaction(
        &mut self,
        transaction: &Transaction,
    ) -> Result<Signature, TransactionError> {
        let message = &transaction.message;
        let signature = *transaction
            .signatures
            .first()
            .ok_or(TransactionError::MissingSignatureForFee)?;
        if !self
            .recent_blockhashes
            .contains(&message.recent_blockhash)
        {
            return Err(TransactionError::BlockhashNotFound);
        }
        transaction.verify()?;
        if self.statuses.contains_key(&signature) {
            return Err(TransactionError::AlreadyProcessed);
        }

        let fee = self.config.lamports_per_signature
            * u64::from(message.header.num_required_signatures);
        let payer = message
            .account_keys
            .first()
            .ok_or(TransactionError::AccountNotFound)?;
        let payer_account = self
            .accounts
            .get_mut(payer)
            .filter(|account| account.lamports > 0)
            .ok_or(TransactionError::AccountNotFound)?;
        if payer_account.lamports < fee {
            return Err(TransactionError::InsufficientFundsForFee);
        }
        payer_account.lamports -= fee;
        self.transaction_count += 1;

        let result = self.execute_instructions(message);
        debug!("transaction {}: {:?}", signature, result);
        self.statuses.insert(signature, result.clone());
        result.map(|()| signature)
    }

    fn execute_instructions(&mut self, message: &Message) -> transaction::Result<()> {
        let mut accounts = self.accounts.clone();
        for (index, instruction) in message.instructions.iter().enumerate() {
            let program_id = message
                .account_keys
                .get(usize::from(instruction.program_id_index))
                .ok_or(TransactionError::ProgramAccountNotFound)?;
            let metas = instruction
                .accounts
                .iter()
                .map(|&account_index| {
                    let account_index = usize::from(account_index);
                    message
                        .account_keys
                        .get(account_index)
                        .map(|pubkey| AccountMeta {
                            pubkey: *pubkey,
                            is_signer: message.is_signer(account_index),
                            is_writable: is_writable(message, account_index),
                        })
                })
                .collect::<Option<Vec<_>>>()
                .ok_or(TransactionError::AccountNotFound)?;
            let mut ctx = InvokeContext::new(&mut accounts, metas, &instruction.data, self.rent);
            process_instruction(program_id, &mut ctx)
                .map_err(|error| TransactionError::InstructionError(index as u8, error))?;
        }

        for (index, key) in message.account_keys.iter().enumerate() {
            if !is_writable(message, index) {
                continue;
            }
            if let Some(account) = accounts.get(key) {
                if account.lamports > 0
                    && !self.rent.is_exempt(account.lamports, account.data.len())
                {
                    return Err(TransactionError::InsufficientFundsForRent {
                        account_index: index as u8,
                    });
                }
            }
        }

        accounts.retain(|_, account| account.lamports > 0);
        self.accounts = accounts;
        Ok(())
    }
}

/// Writability as encoded in the message header.
fn is_writable(message: &Message, index: usize) -> bool {
    let header = &message.header;
    let num_signed = usize::from(header.num_required_signatures);
    if index < num_signed {
        index < num_signed - usize::from(header.num_readonly_signed_accounts)
    } else {
        index
            < message
                .account_keys
                .len()
                .saturating_sub(usize::from(header.num_readonly_unsigned_accounts))
    }
}
