use std::fmt::Debug;

use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};

use crate::rpc::errors::RpcError;

/// The ledger surface the storefront bootstrap consumes.
///
/// Implemented by [`crate::rpc::SolanaRpcConnection`] for live clusters and
/// by the in-memory ledger of `storefront-program-test` for tests.
#[async_trait]
pub trait RpcConnection: Send + Sync + Debug + 'static {
    fn new<U: ToString>(url: U, commitment_config: Option<CommitmentConfig>) -> Self
    where
        Self: Sized;

    fn get_url(&self) -> String;

    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError>;

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, RpcError>;

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError>;

    /// Requests test funds. Returns as soon as the request is accepted, the
    /// caller confirms the returned signature.
    async fn request_airdrop(&mut self, to: &Pubkey, lamports: u64)
        -> Result<Signature, RpcError>;

    /// Whether `signature` has reached `commitment`. A rejected transaction
    /// surfaces as an error rather than `false`.
    async fn confirm_transaction_with_commitment(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<bool, RpcError>;

    /// Submits a signed transaction and waits for confirmation.
    async fn process_transaction(&mut self, transaction: Transaction)
        -> Result<Signature, RpcError>;

    async fn create_and_send_transaction<'a>(
        &'a mut self,
        instructions: &'a [Instruction],
        payer: &'a Pubkey,
        signers: &'a [&'a Keypair],
    ) -> Result<Signature, RpcError> {
        let blockhash = self.get_latest_blockhash().await?;
        let mut transaction = Transaction::new_with_payer(instructions, Some(payer));
        transaction
            .try_sign(signers, blockhash)
            .map_err(|e| RpcError::CustomError(format!("Failed to sign transaction: {}", e)))?;
        self.process_transaction(transaction).await
    }
}
