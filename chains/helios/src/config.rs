use anyhow::{Context, Result};
use config::{Config, Environment, File};
use core_logic::{BridgePolicy, EngineConfig, RetryConfig};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RPC_URL: &str = "https://testnet1.helioschainlabs.org";
pub const DEFAULT_STAKING_CONTRACT: &str = "0x007a1123a54cdD9bA35AD2012DB086b9d8350A5f";

#[derive(Debug, Deserialize, Clone)]
pub struct HeliosConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Queried from the node when absent.
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default = "default_staking_contract")]
    pub staking_contract: String,
    #[serde(default)]
    pub rewards_contract: Option<String>,
    #[serde(default)]
    pub bridge_contract: Option<String>,

    #[serde(default = "default_max_gas_price_gwei")]
    pub max_gas_price_gwei: f64,
    #[serde(default = "default_gas_limit_stake")]
    pub gas_limit_stake: u64,
    #[serde(default = "default_gas_limit_compound")]
    pub gas_limit_compound: u64,
    #[serde(default = "default_gas_limit_bridge")]
    pub gas_limit_bridge: u64,
    #[serde(default = "default_receipt_timeout_secs")]
    pub receipt_timeout_secs: u64,

    #[serde(default = "default_wallets_dir")]
    pub wallets_dir: String,
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    // Engine knobs
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_stake_threshold")]
    pub stake_threshold: f64,
    #[serde(default = "default_stake_fraction")]
    pub stake_fraction: f64,
    #[serde(default = "default_compound_threshold")]
    pub compound_threshold: f64,
    #[serde(default = "default_post_stake_pause_ms")]
    pub post_stake_pause_ms: u64,
    #[serde(default = "default_post_wallet_pause_ms")]
    pub post_wallet_pause_ms: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default)]
    pub bridge: Option<BridgePolicy>,
}

fn default_rpc_url() -> String {
    DEFAULT_RPC_URL.to_string()
}
fn default_staking_contract() -> String {
    DEFAULT_STAKING_CONTRACT.to_string()
}
fn default_max_gas_price_gwei() -> f64 {
    25.0
}
fn default_gas_limit_stake() -> u64 {
    150_000
}
fn default_gas_limit_compound() -> u64 {
    100_000
}
fn default_gas_limit_bridge() -> u64 {
    200_000
}
fn default_receipt_timeout_secs() -> u64 {
    120
}
fn default_wallets_dir() -> String {
    "wallets".to_string()
}
fn default_reports_dir() -> String {
    "reports".to_string()
}
fn default_concurrency() -> usize {
    5
}
fn default_stake_threshold() -> f64 {
    1.0
}
fn default_stake_fraction() -> f64 {
    0.8
}
fn default_compound_threshold() -> f64 {
    0.1
}
fn default_post_stake_pause_ms() -> u64 {
    2000
}
fn default_post_wallet_pause_ms() -> u64 {
    1000
}
fn default_retry_attempts() -> u32 {
    3
}

impl HeliosConfig {
    /// Reads `path` if it exists, then applies `HELIOS_*` environment
    /// overrides. Missing keys fall back to the built-in defaults.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("HELIOS").try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        settings
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!(e))
            .with_context(|| format!("Invalid config {}", path))
    }

    pub fn wallets_dir(&self) -> PathBuf {
        PathBuf::from(&self.wallets_dir)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn to_engine_config(&self) -> EngineConfig {
        let retry = RetryConfig {
            max_attempts: self.retry_attempts,
            ..RetryConfig::default()
        };

        EngineConfig::new()
            .with_concurrency(self.concurrency)
            .with_thresholds(self.stake_threshold, self.compound_threshold)
            .with_stake_fraction(self.stake_fraction)
            .with_bridge(self.bridge.clone())
            .with_pauses(
                Duration::from_millis(self.post_stake_pause_ms),
                Duration::from_millis(self.post_wallet_pause_ms),
            )
            .with_retry(retry)
            .with_reports_dir(&self.reports_dir)
    }
}
