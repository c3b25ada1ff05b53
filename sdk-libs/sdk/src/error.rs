use solana_program::pubkey::Pubkey;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorefrontSdkError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorefrontSdkError {
    #[error("No viable bump seed found for program {program_id}")]
    NoViableBump { program_id: Pubkey },
    #[error("Serialization error")]
    SerializationError,
    #[error("Deserialization error")]
    DeserializationError,
    #[error("Account discriminator mismatch, expected {expected:?}")]
    InvalidDiscriminator { expected: [u8; 8] },
    #[error("{field} is {len} bytes, limit is {limit}")]
    StringTooLong {
        field: &'static str,
        len: usize,
        limit: usize,
    },
}
