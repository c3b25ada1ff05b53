use std::{fmt::Debug, io};

use solana_client::client_error::ClientError;
use solana_sdk::{instruction::InstructionError, transaction::TransactionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RpcError {
    #[error("TransactionError: {0}")]
    TransactionError(#[from] Box<TransactionError>),

    #[error("ClientError: {0}")]
    ClientError(#[from] Box<ClientError>),

    #[error("IoError: {0}")]
    IoError(#[from] Box<io::Error>),

    #[error("Error: `{0}`")]
    CustomError(String),

    #[error("Assert Rpc Error: {0}")]
    AssertRpcError(String),
}

impl RpcError {
    /// The ledger-level rejection carried by this error, if any.
    pub fn transaction_error(&self) -> Option<&TransactionError> {
        match self {
            RpcError::TransactionError(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<TransactionError> for RpcError {
    fn from(err: TransactionError) -> Self {
        RpcError::TransactionError(Box::new(err))
    }
}

/// Client errors that wrap a transaction rejection are unwrapped so callers
/// can match on the `TransactionError` regardless of the backend.
impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        match err.get_transaction_error() {
            Some(transaction_error) => RpcError::TransactionError(Box::new(transaction_error)),
            None => RpcError::ClientError(Box::new(err)),
        }
    }
}

impl From<io::Error> for RpcError {
    fn from(err: io::Error) -> Self {
        RpcError::IoError(Box::new(err))
    }
}

/// Checks that `result` failed in instruction `i` with custom error
/// `expected_error_code`.
pub fn assert_rpc_error<T: Debug>(
    result: Result<T, RpcError>,
    i: u8,
    expected_error_code: u32,
) -> Result<(), RpcError> {
    match result {
        Err(RpcError::TransactionError(ref box_err))
            if matches!(
                **box_err,
                TransactionError::InstructionError(
                    index,
                    InstructionError::Custom(error_code)
                ) if index == i && error_code == expected_error_code
            ) =>
        {
            Ok(())
        }
        Err(RpcError::TransactionError(ref box_err))
            if matches!(
                **box_err,
                TransactionError::InstructionError(_, InstructionError::Custom(_))
            ) =>
        {
            Err(RpcError::AssertRpcError(format!(
                "Expected error code {} in instruction {}, got: {:?}",
                expected_error_code, i, result
            )))
        }
        Err(e) => Err(RpcError::AssertRpcError(format!(
            "Unexpected error type: {:?}",
            e
        ))),
        Ok(_) => Err(RpcError::AssertRpcError(String::from(
            "Expected an error, transaction succeeded",
        ))),
    }
}
