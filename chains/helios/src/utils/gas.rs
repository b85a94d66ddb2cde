use anyhow::{Context, Result};
use ethers::prelude::*;
use std::sync::Arc;
use tracing::warn;

/// Gas limits per operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GasLimits {
    pub stake: u64,
    pub compound: u64,
    pub bridge: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            stake: 150_000,
            compound: 100_000,
            bridge: 200_000,
        }
    }
}

impl GasLimits {
    pub fn stake(&self) -> U256 {
        U256::from(self.stake)
    }

    pub fn compound(&self) -> U256 {
        U256::from(self.compound)
    }

    pub fn bridge(&self) -> U256 {
        U256::from(self.bridge)
    }
}

/// Legacy gas price lookups with a configured ceiling.
#[derive(Clone, Debug)]
pub struct GasManager {
    provider: Arc<Provider<Http>>,
    max_gas_price: U256,
}

impl GasManager {
    pub fn new(provider: Arc<Provider<Http>>, max_gas_price_gwei: f64) -> Result<Self> {
        let max_gas_price = parse_units(max_gas_price_gwei, "gwei")
            .context("Invalid max_gas_price_gwei")?;
        Ok(Self {
            provider,
            max_gas_price,
        })
    }

    pub fn max_gas_price(&self) -> U256 {
        self.max_gas_price
    }

    pub async fn current_price(&self) -> Result<U256> {
        self.provider
            .get_gas_price()
            .await
            .context("Failed to fetch gas price")
    }

    /// Current price, or `None` when the network is above the ceiling.
    pub async fn price_within_ceiling(&self) -> Result<Option<U256>> {
        let price = self.current_price().await?;
        if !self.within_ceiling(price) {
            warn!(
                "Gas price too high: {} gwei (ceiling {} gwei)",
                format_gwei(price),
                format_gwei(self.max_gas_price)
            );
            return Ok(None);
        }
        Ok(Some(price))
    }

    pub fn within_ceiling(&self, price: U256) -> bool {
        price <= self.max_gas_price
    }
}

pub fn parse_units(amount: f64, unit: &str) -> Result<U256> {
    let decimals: usize = match unit {
        "ether" => 18,
        "gwei" => 9,
        _ => 0,
    };
    // f64 Display never uses exponent notation; cut digits the unit cannot hold
    let mut amount_str = format!("{}", amount);
    if let Some(dot) = amount_str.find('.') {
        let end = if decimals == 0 { dot } else { dot + 1 + decimals };
        amount_str.truncate(end.min(amount_str.len()));
    }
    Ok(ethers::utils::parse_units(amount_str, unit)?.into())
}

/// Wei to ether as a float, for display and thresholds.
pub fn wei_to_ether(wei: U256) -> Result<f64> {
    let formatted = ethers::utils::format_units(wei, "ether")?;
    formatted
        .parse::<f64>()
        .with_context(|| format!("Unparseable ether amount {}", formatted))
}

fn format_gwei(wei: U256) -> String {
    ethers::utils::format_units(wei, "gwei").unwrap_or_else(|_| wei.to_string())
}
