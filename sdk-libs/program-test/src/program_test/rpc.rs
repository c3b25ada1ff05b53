use async_trait::async_trait;
use solana_sdk::{
    account::Account,
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::Signature,
    transaction::Transaction,
};
use storefront_client::rpc::{RpcConnection, RpcError};

use crate::program_test::LedgerSimulator;

#[async_trait]
impl RpcConnection for LedgerSimulator {
    fn new<U: ToString>(_url: U, _commitment_config: Option<CommitmentConfig>) -> Self
    where
        Self: Sized,
    {
        Self::default()
    }

    fn get_url(&self) -> String {
        "get_url doesn't make sense for LedgerSimulator".to_string()
    }

    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        Ok(self.account(&address).cloned())
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, RpcError> {
        Ok(self.account(pubkey).map_or(0, |account| account.lamports))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        Ok(self.rent().minimum_balance(data_len))
    }

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError> {
        Ok(self.advance_blockhash())
    }

    async fn request_airdrop(
        &mut self,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, RpcError> {
        Ok(self.airdrop(to, lamports))
    }

    async fn confirm_transaction_with_commitment(
        &self,
        signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<bool, RpcError> {
        match self.signature_status(signature) {
            Some(Ok(())) => Ok(true),
            Some(Err(error)) => Err(RpcError::from(error.clone())),
            None => Ok(false),
        }
    }

    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        self.execute_transaction(&transaction)
            .map_err(RpcError::from)
    }
}
