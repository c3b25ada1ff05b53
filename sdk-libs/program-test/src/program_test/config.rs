#[derive(Debug, Clone)]
pub struct LedgerSimulatorConfig {
    /// Fee charged per required signature.
    pub lamports_per_signature: u64,
    /// Number of issued blockhashes that stay valid.
    pub max_recent_blockhashes: usize,
    /// When false airdrop requests are accepted but never land, so funding
    /// confirmation cannot succeed.
    pub airdrops_land: bool,
}

impl Default for LedgerSimulatorConfig {
    fn default() -> Self {
        Self {
            lamports_per_signature: 5_000,
            max_recent_blockhashes: 150,
            airdrops_land: true,
        }
    }
}
