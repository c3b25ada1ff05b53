use std::{future::Future, time::Duration};

use solana_sdk::{commitment_config::CommitmentConfig, signature::Signature};
use storefront_client::rpc::RpcConnection;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::StorefrontError;

/// Cancellation shared by every ledger call of a run, plus a timeout that
/// bounds each call on its own. A stage issuing several calls may take a
/// multiple of the timeout.
#[derive(Debug, Clone)]
pub struct Deadline {
    timeout: Duration,
    cancellation_token: CancellationToken,
}

impl Deadline {
    pub fn new(timeout: Duration, cancellation_token: CancellationToken) -> Self {
        Self {
            timeout,
            cancellation_token,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation_token
    }

    /// Drives `future` until it completes, a fresh timeout elapses or the
    /// token is cancelled, whichever comes first. An abandoned submission may still
    /// land on the ledger.
    pub async fn run<F, T, E>(&self, operation: &'static str, future: F) -> Result<T, StorefrontError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<StorefrontError>,
    {
        if self.cancellation_token.is_cancelled() {
            return Err(StorefrontError::Cancelled { operation });
        }
        tokio::select! {
            biased;
            _ = self.cancellation_token.cancelled() => {
                Err(StorefrontError::Cancelled { operation })
            }
            result = timeout(self.timeout, future) => match result {
                Ok(result) => result.map_err(Into::into),
                Err(_) => Err(StorefrontError::DeadlineExceeded {
                    operation,
                    timeout: self.timeout,
                }),
            },
        }
    }

    /// Polls `signature` every `poll_interval` until it reaches `commitment`.
    pub async fn wait_for_confirmation<R: RpcConnection>(
        &self,
        operation: &'static str,
        rpc: &R,
        signature: &Signature,
        commitment: CommitmentConfig,
        poll_interval: Duration,
    ) -> Result<(), StorefrontError> {
        self.run(operation, async {
            loop {
                if rpc
                    .confirm_transaction_with_commitment(signature, commitment)
                    .await?
                {
                    return Ok::<(), StorefrontError>(());
                }
                debug!("{} not yet at {:?}", signature, commitment.commitment);
                sleep(poll_interval).await;
            }
        })
        .await
    }
}
