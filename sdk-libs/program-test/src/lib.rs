//! In-memory ledger implementing [`storefront_client::rpc::RpcConnection`].
//!
//! [`LedgerSimulator`] executes transactions against a map of accounts with
//! the parts of the runtime the storefront bootstrap depends on: recent
//! blockhashes, signature verification, fees, rent exemption, per
//! transaction atomicity and native implementations of the System, SPL
//! Token, Associated Token, Token Metadata and Fixed Price Sale instructions
//! it submits.
mod processor;
pub mod program_test;

pub use program_test::{config::LedgerSimulatorConfig, LedgerSimulator};
