use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use clap::ValueEnum;
use solana_sdk::{
    commitment_config::{CommitmentConfig, CommitmentLevel},
    native_token::sol_to_lamports,
};
use storefront_client::rpc::{RetryConfig, SolanaRpcUrl};
use storefront_sdk::{DEFAULT_SELLER_FEE_BASIS_POINTS, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};

use crate::{cli::Cli, errors::ConfigError};

pub const DEFAULT_STORE_NAME: &str = "Bau Jee di bhatti";
pub const DEFAULT_STORE_DESCRIPTION: &str = "sastay may phastay saaray hastay hastay ::(";

/// Which minted asset gets listed for sale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SalePick {
    #[default]
    First,
    Index(usize),
    Name(String),
}

impl FromStr for SalePick {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "first" {
            return Ok(SalePick::First);
        }
        if let Some(index) = s.strip_prefix("index:") {
            return index
                .parse()
                .map(SalePick::Index)
                .map_err(|_| ConfigError::InvalidSalePick(s.to_string()));
        }
        match s.strip_prefix("name:") {
            Some(name) if !name.is_empty() => Ok(SalePick::Name(name.to_string())),
            _ => Err(ConfigError::InvalidSalePick(s.to_string())),
        }
    }
}

impl fmt::Display for SalePick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SalePick::First => write!(f, "first"),
            SalePick::Index(index) => write!(f, "index:{}", index),
            SalePick::Name(name) => write!(f, "name:{}", name),
        }
    }
}

/// How the store, vault and listing transactions are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SubmissionStrategy {
    /// Store, then vault, then listing, each confirmed before the next.
    #[default]
    Sequential,
    /// Vault first, then store creation and listing in one transaction.
    Atomic,
}

/// Parameters of one bootstrap run, independent of the cluster it runs on.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub airdrop_lamports: u64,
    pub seller_fee_basis_points: u16,
    pub store_name: String,
    pub store_description: String,
    pub max_supply: Option<u64>,
    pub sale_pick: SalePick,
    pub strategy: SubmissionStrategy,
    /// Commitment the funding airdrop has to reach.
    pub funding_commitment: CommitmentConfig,
    /// Bound on each ledger call, not on a stage as a whole.
    pub stage_timeout: Duration,
    pub confirmation_poll_interval: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            airdrop_lamports: sol_to_lamports(2.0),
            seller_fee_basis_points: DEFAULT_SELLER_FEE_BASIS_POINTS,
            store_name: DEFAULT_STORE_NAME.to_string(),
            store_description: DEFAULT_STORE_DESCRIPTION.to_string(),
            max_supply: Some(1),
            sale_pick: SalePick::First,
            strategy: SubmissionStrategy::Sequential,
            funding_commitment: CommitmentConfig::finalized(),
            stage_timeout: Duration::from_secs(120),
            confirmation_poll_interval: Duration::from_millis(500),
        }
    }
}

impl BootstrapConfig {
    /// Checks what the store program would reject, before anything is paid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_store_field("store name", &self.store_name, NAME_MAX_LEN)?;
        check_store_field(
            "store description",
            &self.store_description,
            DESCRIPTION_MAX_LEN,
        )
    }
}

fn check_store_field(field: &'static str, value: &str, limit: usize) -> Result<(), ConfigError> {
    if value.len() > limit {
        return Err(ConfigError::StoreFieldTooLong {
            field,
            len: value.len(),
            limit,
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    pub cluster: SolanaRpcUrl,
    pub commitment: CommitmentConfig,
    pub retry_config: RetryConfig,
    pub assets_dir: PathBuf,
    pub asset_count: usize,
    pub bootstrap: BootstrapConfig,
}

impl StorefrontConfig {
    pub fn new_from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let cluster = cli
            .cluster
            .parse::<SolanaRpcUrl>()
            .map_err(|_| ConfigError::InvalidCluster(cli.cluster.clone()))?;
        let commitment = CommitmentLevel::from_str(&cli.commitment)
            .map(|commitment| CommitmentConfig { commitment })
            .map_err(|_| ConfigError::InvalidCommitment(cli.commitment.clone()))?;
        if !cli.airdrop_sol.is_finite() || cli.airdrop_sol <= 0.0 {
            return Err(ConfigError::InvalidAirdropAmount(cli.airdrop_sol));
        }
        let stage_timeout = Duration::from_secs(cli.stage_timeout_secs);

        let bootstrap = BootstrapConfig {
            airdrop_lamports: sol_to_lamports(cli.airdrop_sol),
            seller_fee_basis_points: cli.seller_fee_basis_points,
            store_name: cli.store_name.clone(),
            store_description: cli.store_description.clone(),
            max_supply: Some(cli.max_supply),
            sale_pick: cli.sell.parse()?,
            strategy: cli.strategy,
            stage_timeout,
            ..BootstrapConfig::default()
        };
        bootstrap.validate()?;

        Ok(Self {
            cluster,
            commitment,
            retry_config: RetryConfig {
                max_retries: cli.max_retries,
                retry_delay: Duration::from_millis(cli.retry_delay_ms),
                timeout: stage_timeout,
            },
            assets_dir: cli.assets_dir.clone(),
            asset_count: cli.asset_count,
            bootstrap,
        })
    }
}
