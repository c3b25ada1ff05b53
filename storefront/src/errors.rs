use std::{path::PathBuf, time::Duration};

use solana_sdk::{program_error::ProgramError, pubkey::Pubkey, signature::Signature};
use storefront_client::rpc::RpcError;
use storefront_sdk::StorefrontSdkError;
use thiserror::Error;

use crate::bootstrap::BootstrapStage;

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("SDK error: {0}")]
    Sdk(#[from] StorefrontSdkError),

    #[error("Program error: {0}")]
    Program(#[from] ProgramError),

    #[error("Funding transfer {signature} to {wallet} was not confirmed")]
    FundingNotConfirmed { wallet: Pubkey, signature: Signature },

    #[error("Cannot {step} at stage {current}, requires {required}")]
    OutOfOrder {
        step: &'static str,
        required: BootstrapStage,
        current: BootstrapStage,
    },

    #[error("{operation} did not complete within {timeout:?}")]
    DeadlineExceeded {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("{operation} was cancelled")]
    Cancelled { operation: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StorefrontError {
    /// The ledger rejection behind this error, if it came from a submitted
    /// transaction.
    pub fn transaction_error(&self) -> Option<&solana_sdk::transaction::TransactionError> {
        match self {
            StorefrontError::Rpc(error) => error.transaction_error(),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Asset {index} ({name}) has no file reference to use as content uri")]
    MissingFileReference { index: usize, name: String },

    #[error("Asset {index} ({name}) has an empty content uri")]
    EmptyUri { index: usize, name: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid cluster: {0}")]
    InvalidCluster(String),

    #[error("Invalid commitment level: {0}")]
    InvalidCommitment(String),

    #[error("Invalid sale pick `{0}`, expected first, index:<n> or name:<asset name>")]
    InvalidSalePick(String),

    #[error("Invalid airdrop amount: {0} SOL")]
    InvalidAirdropAmount(f64),

    #[error("{field} is {len} bytes, limit is {limit}")]
    StoreFieldTooLong {
        field: &'static str,
        len: usize,
        limit: usize,
    },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("No assets were minted")]
    NoAssets,

    #[error("Asset index {index} out of range, {len} assets minted")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No minted asset named `{name}`")]
    NameNotFound { name: String },
}
