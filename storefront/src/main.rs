use anyhow::Result;
use clap::Parser;
use storefront::{
    cli::Cli, metadata::load_metadata_dir, telemetry::setup_telemetry, StoreBootstrap,
    StorefrontConfig, TokenMetadataMinter,
};
use storefront_client::rpc::SolanaRpcConnection;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    setup_telemetry();

    let cli = Cli::parse();
    let config = StorefrontConfig::new_from_cli(&cli)?;

    let cancellation_token = CancellationToken::new();
    let cancellation_token_clone = cancellation_token.clone();
    let _terminate_handle = tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            cancellation_token_clone.cancel();
            info!("Ctrl-C received, abandoning the current stage...");
        }
    });

    let metadata = load_metadata_dir(&config.assets_dir, config.asset_count)?;
    info!(
        "Loaded {} asset descriptors from {}",
        metadata.len(),
        config.assets_dir.display()
    );

    let rpc = SolanaRpcConnection::new_with_retry(
        config.cluster.to_string(),
        Some(config.commitment),
        Some(config.retry_config),
    );
    let mut bootstrap = StoreBootstrap::new(
        rpc,
        TokenMetadataMinter::default(),
        config.bootstrap,
        cancellation_token,
    );

    match bootstrap.run(&metadata).await {
        Ok(report) => {
            info!(
                "Store {} lists {} via selling resource {} ({})",
                report.store,
                report.selling_asset.mint,
                report.selling_resource,
                report.listing_signature
            );
            Ok(())
        }
        Err(e) => Err(anyhow::Error::from(e)
            .context(format!("bootstrap failed at stage {}", bootstrap.stage()))),
    }
}
