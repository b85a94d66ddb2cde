use crate::error::ConfigError;
use crate::utils::retry::RetryConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which slice of the credential set this run processes (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSelection {
    pub batch_number: usize,
    pub total_batches: usize,
}

impl BatchSelection {
    pub fn new(batch_number: usize, total_batches: usize) -> Result<Self, ConfigError> {
        if total_batches == 0 {
            return Err(ConfigError::InvalidValue {
                field: "total_batches".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if batch_number == 0 || batch_number > total_batches {
            return Err(ConfigError::BatchOutOfRange {
                batch_number,
                total_batches,
            });
        }
        Ok(Self {
            batch_number,
            total_batches,
        })
    }
}

/// Optional bridge step performed after compounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgePolicy {
    pub target_chain: String,
    /// Share of the post-stake balance to bridge.
    pub fraction: f64,
    /// Balance a wallet must hold before anything is bridged.
    pub min_balance: f64,
}

/// Knobs for one batch run, injected into the coordinator.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub concurrency: usize,
    pub stake_threshold: f64,
    pub stake_fraction: f64,
    pub compound_threshold: f64,
    pub bridge: Option<BridgePolicy>,
    pub post_stake_pause: Duration,
    pub post_wallet_pause: Duration,
    pub retry: RetryConfig,
    pub reports_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            stake_threshold: 1.0,
            stake_fraction: 0.8,
            compound_threshold: 0.1,
            bridge: None,
            post_stake_pause: Duration::from_secs(2),
            post_wallet_pause: Duration::from_secs(1),
            retry: RetryConfig::default(),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_thresholds(mut self, stake: f64, compound: f64) -> Self {
        self.stake_threshold = stake;
        self.compound_threshold = compound;
        self
    }

    pub fn with_stake_fraction(mut self, fraction: f64) -> Self {
        self.stake_fraction = fraction;
        self
    }

    pub fn with_bridge(mut self, bridge: Option<BridgePolicy>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_pauses(mut self, post_stake: Duration, post_wallet: Duration) -> Self {
        self.post_stake_pause = post_stake;
        self.post_wallet_pause = post_wallet;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_reports_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.reports_dir = dir.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(invalid("concurrency", "must be at least 1"));
        }
        if !(self.stake_fraction > 0.0 && self.stake_fraction <= 1.0) {
            return Err(invalid("stake_fraction", "must be in (0, 1]"));
        }
        if self.stake_threshold < 0.0 || self.compound_threshold < 0.0 {
            return Err(invalid("thresholds", "must not be negative"));
        }
        if let Some(bridge) = &self.bridge {
            if !(bridge.fraction > 0.0 && bridge.fraction <= 1.0) {
                return Err(invalid("bridge.fraction", "must be in (0, 1]"));
            }
            if bridge.target_chain.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: "bridge.target_chain".to_string(),
                });
            }
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_selection_bounds() {
        assert!(BatchSelection::new(1, 3).is_ok());
        assert!(BatchSelection::new(3, 3).is_ok());
        assert!(matches!(
            BatchSelection::new(4, 3),
            Err(ConfigError::BatchOutOfRange { .. })
        ));
        assert!(BatchSelection::new(0, 3).is_err());
        assert!(BatchSelection::new(1, 0).is_err());
    }

    #[test]
    fn test_engine_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.concurrency, 5);
        assert_eq!(config.stake_fraction, 0.8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_rejects_zero_concurrency() {
        let config = EngineConfig::new().with_concurrency(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_engine_rejects_bad_bridge_fraction() {
        let config = EngineConfig::new().with_bridge(Some(BridgePolicy {
            target_chain: "sepolia".to_string(),
            fraction: 1.5,
            min_balance: 0.0,
        }));
        assert!(config.validate().is_err());
    }
}
