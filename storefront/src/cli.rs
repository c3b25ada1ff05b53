use std::path::PathBuf;

use clap::Parser;

use crate::config::{SubmissionStrategy, DEFAULT_STORE_DESCRIPTION, DEFAULT_STORE_NAME};

/// Mints the assets described in `--assets-dir` and lists one of them on a
/// new fixed-price-sale store.
#[derive(Parser, Clone, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// devnet, testnet, localnet or an rpc url.
    #[arg(long, env = "STOREFRONT_CLUSTER", default_value = "devnet")]
    pub cluster: String,

    #[arg(long, env = "STOREFRONT_COMMITMENT", default_value = "confirmed")]
    pub commitment: String,

    /// Directory holding `0.json`, `1.json`, ...
    #[arg(long, env = "STOREFRONT_ASSETS_DIR", default_value = "./assets")]
    pub assets_dir: PathBuf,

    #[arg(long, env = "STOREFRONT_ASSET_COUNT", default_value = "3")]
    pub asset_count: usize,

    #[arg(long, env = "STOREFRONT_AIRDROP_SOL", default_value = "2")]
    pub airdrop_sol: f64,

    #[arg(
        long,
        env = "STOREFRONT_SELLER_FEE_BASIS_POINTS",
        default_value = "500"
    )]
    pub seller_fee_basis_points: u16,

    #[arg(long, env = "STOREFRONT_STORE_NAME", default_value = DEFAULT_STORE_NAME)]
    pub store_name: String,

    #[arg(
        long,
        env = "STOREFRONT_STORE_DESCRIPTION",
        default_value = DEFAULT_STORE_DESCRIPTION
    )]
    pub store_description: String,

    #[arg(long, env = "STOREFRONT_MAX_SUPPLY", default_value = "1")]
    pub max_supply: u64,

    /// first, index:<n> or name:<asset name>.
    #[arg(long, env = "STOREFRONT_SELL", default_value = "first")]
    pub sell: String,

    #[arg(
        long,
        env = "STOREFRONT_STRATEGY",
        value_enum,
        default_value_t = SubmissionStrategy::Sequential
    )]
    pub strategy: SubmissionStrategy,

    #[arg(long, env = "STOREFRONT_STAGE_TIMEOUT_SECS", default_value = "120")]
    pub stage_timeout_secs: u64,

    #[arg(long, env = "STOREFRONT_MAX_RETRIES", default_value = "10")]
    pub max_retries: u32,

    #[arg(long, env = "STOREFRONT_RETRY_DELAY_MS", default_value = "1000")]
    pub retry_delay_ms: u64,
}
