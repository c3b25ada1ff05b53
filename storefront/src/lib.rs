pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod deadline;
pub mod errors;
pub mod metadata;
pub mod minting;
pub mod telemetry;
pub mod token_account;

pub use bootstrap::{BootstrapReport, BootstrapStage, StoreBootstrap};
pub use config::{BootstrapConfig, SalePick, StorefrontConfig, SubmissionStrategy};
pub use deadline::Deadline;
pub use errors::StorefrontError;
pub use minting::{AssetMinter, MintRequest, MintedAsset, TokenMetadataMinter};
pub use token_account::{ProvisionedVault, TokenAccountOwner};
