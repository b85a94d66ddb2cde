use helios_bot::config::HeliosConfig;
use helios_bot::provider::HeliosOperations;
use helios_bot::signer::EthersAddressDeriver;

use anyhow::{Context, Result};
use clap::Parser;
use core_logic::batch::{batch_bounds, select_batch};
use core_logic::{
    setup_logger, BatchCoordinator, BatchSelection, MetricsCollector, ReportAssembler,
    WalletManager,
};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about = "Helios multi-wallet stake/compound bot", long_about = None)]
struct Args {
    /// Batch to process (1-based)
    #[arg(short, long, default_value_t = 1)]
    batch: usize,
    #[arg(short, long, default_value_t = 3)]
    total_batches: usize,
    #[arg(short, long, default_value = "chains/helios/config.toml")]
    config: String,
    #[arg(short, long)]
    export_metrics: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Keep guard alive for file logging
    let _log_guard = setup_logger("helios");
    dotenv().ok();

    let args = Args::parse();
    let force_run = force_run_enabled();
    if force_run {
        info!("Force run enabled");
    }

    let selection = BatchSelection::new(args.batch, args.total_batches)?;

    info!("Loading config from: {}", args.config);
    let config = HeliosConfig::load(&args.config)?;

    let wallets_dir = config.wallets_dir();
    let manager = WalletManager::load_dir(&wallets_dir, &EthersAddressDeriver)?;

    if manager.is_empty() {
        error!(
            "No wallets found! Add .txt files to {}",
            wallets_dir.display()
        );
        let written = WalletManager::create_sample_files(&wallets_dir)?;
        println!("No wallet credentials found in {}.", wallets_dir.display());
        for path in &written {
            println!("  created template {}", path.display());
        }
        println!("Put one private key per line in a .txt file there and run again.");

        if force_run {
            return Ok(());
        }
        anyhow::bail!("No wallet credentials in {}", wallets_dir.display());
    }

    let credentials = manager.into_credentials();
    let bounds = batch_bounds(credentials.len(), selection);
    if bounds.is_empty() {
        info!("No wallets to process in batch {}", selection.batch_number);
        return Ok(());
    }
    info!(
        "Batch {}: processing wallets {}-{} of {}",
        selection.batch_number,
        bounds.start + 1,
        bounds.end,
        credentials.len()
    );
    let batch = select_batch(&credentials, selection).to_vec();
    drop(credentials);

    let provider = Arc::new(HeliosOperations::connect(&config).await?);
    let metrics = Arc::new(MetricsCollector::new());
    let coordinator =
        BatchCoordinator::new(provider, config.to_engine_config(), Arc::clone(&metrics))?;

    let result = coordinator.run_batch(selection.batch_number, batch).await;

    let assembler = ReportAssembler::new(coordinator.config().reports_dir.clone());
    let report = assembler.assemble(&result).await;

    if let Some(metrics_path) = &args.export_metrics {
        match metrics.export_to_file(metrics_path).await {
            Ok(_) => info!("Metrics exported to {}", metrics_path),
            Err(e) => error!("Failed to export metrics: {}", e),
        }
    }

    let paths = report.context("Failed to write batch report")?;
    info!(
        "Batch {} completed, report saved to {}",
        selection.batch_number,
        paths.historical.display()
    );

    Ok(())
}

fn force_run_enabled() -> bool {
    env::var("FORCE_RUN")
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
