use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
    time::Duration,
};

use async_trait::async_trait;
use solana_client::{client_error::ClientErrorKind, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, hash::Hash, pubkey::Pubkey,
    signature::Signature, transaction::Transaction,
};
use tokio::time::{sleep, Instant};
use tracing::warn;

use crate::rpc::{errors::RpcError, rpc_connection::RpcConnection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolanaRpcUrl {
    Testnet,
    Devnet,
    Localnet,
    Custom(String),
}

impl Display for SolanaRpcUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            SolanaRpcUrl::Testnet => "https://api.testnet.solana.com".to_string(),
            SolanaRpcUrl::Devnet => "https://api.devnet.solana.com".to_string(),
            SolanaRpcUrl::Localnet => "http://localhost:8899".to_string(),
            SolanaRpcUrl::Custom(url) => url.clone(),
        };
        write!(f, "{}", str)
    }
}

impl FromStr for SolanaRpcUrl {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "testnet" => Ok(SolanaRpcUrl::Testnet),
            "devnet" => Ok(SolanaRpcUrl::Devnet),
            "localnet" | "localhost" => Ok(SolanaRpcUrl::Localnet),
            url if url.starts_with("http://") || url.starts_with("https://") => {
                Ok(SolanaRpcUrl::Custom(url.to_string()))
            }
            other => Err(RpcError::CustomError(format!(
                "Unknown cluster `{}`, expected devnet, testnet, localnet or an http(s) url",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub retry_delay: Duration,
    /// Upper bound on the time spent retrying a single call.
    pub timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_retries: 10,
            retry_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

pub struct SolanaRpcConnection {
    pub client: RpcClient,
    pub retry_config: RetryConfig,
}

impl Debug for SolanaRpcConnection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SolanaRpcConnection {{ client: {:?} }}",
            self.client.url()
        )
    }
}

impl SolanaRpcConnection {
    pub fn new_with_retry<U: ToString>(
        url: U,
        commitment_config: Option<CommitmentConfig>,
        retry_config: Option<RetryConfig>,
    ) -> Self {
        let commitment_config = commitment_config.unwrap_or(CommitmentConfig::confirmed());
        let client = RpcClient::new_with_commitment(url.to_string(), commitment_config);
        let retry_config = retry_config.unwrap_or_default();
        Self {
            client,
            retry_config,
        }
    }

    /// Only transport failures are retried. Anything the cluster answered,
    /// including transaction rejections, is returned to the caller as is.
    fn should_retry(&self, error: &RpcError) -> bool {
        match error {
            RpcError::ClientError(e) => {
                matches!(e.kind(), ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_))
            }
            _ => false,
        }
    }

    async fn retry<F, Fut, T>(&self, operation: F) -> Result<T, RpcError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, RpcError>>,
    {
        let mut attempts = 0;
        let start_time = Instant::now();
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !self.should_retry(&e) {
                        return Err(e);
                    }
                    attempts += 1;
                    if attempts >= self.retry_config.max_retries
                        || start_time.elapsed() >= self.retry_config.timeout
                    {
                        return Err(e);
                    }
                    warn!(
                        "Operation failed, retrying in {:?} (attempt {}/{}): {:?}",
                        self.retry_config.retry_delay,
                        attempts,
                        self.retry_config.max_retries,
                        e
                    );
                    sleep(self.retry_config.retry_delay).await;
                }
            }
        }
    }
}

#[async_trait]
impl RpcConnection for SolanaRpcConnection {
    fn new<U: ToString>(url: U, commitment_config: Option<CommitmentConfig>) -> Self
    where
        Self: Sized,
    {
        Self::new_with_retry(url, commitment_config, None)
    }

    fn get_url(&self) -> String {
        self.client.url()
    }

    async fn get_account(&self, address: Pubkey) -> Result<Option<Account>, RpcError> {
        self.retry(|| async {
            self.client
                .get_account_with_commitment(&address, self.client.commitment())
                .await
                .map(|response| response.value)
                .map_err(RpcError::from)
        })
        .await
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> Result<u64, RpcError> {
        self.retry(|| async { self.client.get_balance(pubkey).await.map_err(RpcError::from) })
            .await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, RpcError> {
        self.retry(|| async {
            self.client
                .get_minimum_balance_for_rent_exemption(data_len)
                .await
                .map_err(RpcError::from)
        })
        .await
    }

    async fn get_latest_blockhash(&mut self) -> Result<Hash, RpcError> {
        self.retry(|| async {
            self.client
                // Confirmed commitments land more reliably than finalized
                .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
                .await
                .map(|(blockhash, _last_valid_block_height)| blockhash)
                .map_err(RpcError::from)
        })
        .await
    }

    async fn request_airdrop(
        &mut self,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, RpcError> {
        self.retry(|| async {
            self.client
                .request_airdrop(to, lamports)
                .await
                .map_err(RpcError::from)
        })
        .await
    }

    async fn confirm_transaction_with_commitment(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<bool, RpcError> {
        let status = self
            .retry(|| async {
                self.client
                    .get_signature_status_with_commitment(signature, commitment)
                    .await
                    .map_err(RpcError::from)
            })
            .await?;
        match status {
            Some(Ok(())) => Ok(true),
            Some(Err(e)) => Err(RpcError::from(e)),
            None => Ok(false),
        }
    }

    async fn process_transaction(
        &mut self,
        transaction: Transaction,
    ) -> Result<Signature, RpcError> {
        self.retry(|| async {
            self.client
                .send_and_confirm_transaction(&transaction)
                .await
                .map_err(RpcError::from)
        })
        .await
    }
}
