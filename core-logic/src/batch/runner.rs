use crate::batch::types::{Credential, WalletFailure, WalletOutcome, WalletResult, WalletStatus};
use crate::config::EngineConfig;
use crate::metrics::MetricsCollector;
use crate::traits::OperationProvider;
use crate::utils::retry::with_retry;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the fixed stake / compound / bridge sequence for one wallet.
pub struct WalletTaskRunner {
    provider: Arc<dyn OperationProvider>,
    config: Arc<EngineConfig>,
    metrics: Arc<MetricsCollector>,
}

impl WalletTaskRunner {
    pub fn new(
        provider: Arc<dyn OperationProvider>,
        config: Arc<EngineConfig>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            provider,
            config,
            metrics,
        }
    }

    /// Always returns a terminal outcome; errors end up in `Failed`.
    pub async fn run(&self, credential: &Credential) -> WalletOutcome {
        let start_time = Instant::now();
        let mut result = WalletResult::pending(credential);

        info!(
            "Processing wallet {} ({}...)",
            credential.id,
            credential.short_address()
        );

        match self.execute(credential, &mut result).await {
            Ok(()) => {
                let duration = start_time.elapsed();
                self.metrics.record_wallet(duration, true);
                result.status = WalletStatus::Completed;

                info!(
                    target: "wallet_result",
                    "[WL:{}] Success stake={:.4} compound={:.4} bridge={:.4} balance {:.4} -> {:.4} in {:.1}s",
                    credential.id,
                    result.stake_amount,
                    result.compound_amount,
                    result.bridge_amount,
                    result.initial_balance,
                    result.final_balance,
                    duration.as_secs_f64()
                );

                WalletOutcome::Completed(result)
            }
            Err(e) => {
                let duration = start_time.elapsed();
                self.metrics.record_wallet(duration, false);

                let message = format!("{:#}", e).replace('\n', " | ");
                result.status = WalletStatus::Error;
                result.error = Some(message.clone());

                warn!(
                    target: "wallet_result",
                    "[WL:{}] Failed {} in {:.1}s",
                    credential.id,
                    message,
                    duration.as_secs_f64()
                );

                WalletOutcome::Failed(WalletFailure {
                    wallet_id: credential.id.clone(),
                    message,
                    partial: result,
                })
            }
        }
    }

    async fn execute(&self, credential: &Credential, result: &mut WalletResult) -> Result<()> {
        let provider = &self.provider;
        let address = credential.address.as_str();

        // 1. Current state
        let state = self
            .call(&format!("get_wallet_state({})", credential.id), || {
                provider.get_wallet_state(address)
            })
            .await?;
        result.initial_balance = state.balance;
        result.pending_rewards = state.pending_rewards;

        // 2. Stake a share of the balance
        if state.balance > self.config.stake_threshold {
            let amount = state.balance * self.config.stake_fraction;
            info!("Staking {:.4} from {}", amount, credential.id);

            let tx = self
                .call(&format!("submit_stake({})", credential.id), || {
                    provider.submit_stake(credential, amount)
                })
                .await?;

            match tx {
                Some(tx_hash) => {
                    result.stake_tx = Some(tx_hash);
                    result.stake_amount = amount;
                    tokio::time::sleep(self.config.post_stake_pause).await;
                }
                None => debug!("Stake declined for {}", credential.id),
            }
        }

        // 3. Compound pending rewards
        if state.pending_rewards > self.config.compound_threshold {
            info!(
                "Compounding {:.4} rewards for {}",
                state.pending_rewards, credential.id
            );

            let tx = self
                .call(&format!("submit_compound({})", credential.id), || {
                    provider.submit_compound(credential)
                })
                .await?;

            match tx {
                Some(tx_hash) => {
                    result.compound_tx = Some(tx_hash);
                    result.compound_amount = state.pending_rewards;
                }
                None => debug!("Compound declined for {}", credential.id),
            }
        }

        // 4. Optional bridge of what is left after staking
        if let Some(bridge) = &self.config.bridge {
            let available = state.balance - result.stake_amount;
            if available > bridge.min_balance && available > 0.0 {
                let amount = available * bridge.fraction;
                info!(
                    "Bridging {:.4} from {} to {}",
                    amount, credential.id, bridge.target_chain
                );

                let target = bridge.target_chain.as_str();
                let tx = self
                    .call(&format!("submit_bridge({})", credential.id), || {
                        provider.submit_bridge(credential, amount, target)
                    })
                    .await?;

                match tx {
                    Some(tx_hash) => {
                        result.bridge_tx = Some(tx_hash);
                        result.bridge_amount = amount;
                    }
                    None => debug!("Bridge declined for {}", credential.id),
                }
            }
        }

        // 5. Post-operation balance
        let final_state = self
            .call(&format!("get_wallet_state({})", credential.id), || {
                provider.get_wallet_state(address)
            })
            .await?;
        result.final_balance = final_state.balance;

        tokio::time::sleep(self.config.post_wallet_pause).await;

        Ok(())
    }

    /// Provider call under the retry policy, timing every attempt.
    async fn call<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let metrics = &self.metrics;
        with_retry(&self.config.retry, operation_name, || {
            let attempt = operation();
            async move {
                let started = Instant::now();
                let outcome = attempt.await;
                metrics.record_provider_call(started.elapsed());
                outcome
            }
        })
        .await
    }
}
