pub mod config;
mod ledger_simulator;
mod rpc;

pub use ledger_simulator::LedgerSimulator;
