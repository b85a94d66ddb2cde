use crate::batch::limiter::ConcurrencyLimiter;
use crate::batch::runner::WalletTaskRunner;
use crate::batch::types::{
    BatchResult, Credential, WalletFailure, WalletOutcome, WalletResult, WalletStatus,
};
use crate::config::EngineConfig;
use crate::metrics::MetricsCollector;
use crate::traits::OperationProvider;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, Instrument};

/// Fans a batch of wallets out to the task runner and folds the outcomes.
pub struct BatchCoordinator {
    runner: Arc<WalletTaskRunner>,
    limiter: ConcurrencyLimiter,
    config: Arc<EngineConfig>,
    metrics: Arc<MetricsCollector>,
}

impl BatchCoordinator {
    pub fn new(
        provider: Arc<dyn OperationProvider>,
        config: EngineConfig,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let limiter = ConcurrencyLimiter::new(config.concurrency);
        let runner = Arc::new(WalletTaskRunner::new(
            provider,
            Arc::clone(&config),
            Arc::clone(&metrics),
        ));

        Ok(Self {
            runner,
            limiter,
            config,
            metrics,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Runs every credential concurrently (bounded by the limiter) and waits
    /// for all of them before aggregating.
    ///
    /// Outcomes are folded in dispatch order so repeated runs over the same
    /// input produce identically ordered reports.
    pub async fn run_batch(&self, batch_number: usize, credentials: Vec<Credential>) -> BatchResult {
        let started_at = Utc::now();
        let total = credentials.len();
        let mut set = JoinSet::new();

        info!(
            "Processing {} wallets in batch {} (concurrency {})",
            total,
            batch_number,
            self.limiter.limit()
        );

        for (index, credential) in credentials.into_iter().enumerate() {
            let runner = Arc::clone(&self.runner);
            let limiter = self.limiter.clone();
            let span = tracing::info_span!("wallet", wallet_id = credential.id.as_str());

            set.spawn(
                async move {
                    let outcome = match limiter.acquire().await {
                        Ok(_slot) => runner.run(&credential).await,
                        Err(e) => {
                            let message = format!("{:#}", e);
                            let mut partial = WalletResult::pending(&credential);
                            partial.status = WalletStatus::Error;
                            partial.error = Some(message.clone());
                            WalletOutcome::Failed(WalletFailure {
                                wallet_id: credential.id.clone(),
                                message,
                                partial,
                            })
                        }
                    };
                    (index, outcome)
                }
                .instrument(span),
            );
        }

        let mut outcomes: Vec<Option<WalletOutcome>> = vec![None; total];
        let mut lost_tasks = 0usize;

        while let Some(res) = set.join_next().await {
            match res {
                Ok((index, outcome)) => {
                    if let WalletOutcome::Failed(failure) = &outcome {
                        error!("Wallet {} failed: {}", failure.wallet_id, failure.message);
                    }
                    outcomes[index] = Some(outcome);
                }
                Err(e) => {
                    error!("A wallet task panicked or failed to join: {:?}", e);
                    lost_tasks += 1;
                }
            }
        }

        let mut result = BatchResult::new(batch_number);
        for outcome in outcomes.into_iter().flatten() {
            result.record(outcome);
        }
        for _ in 0..lost_tasks {
            result.record_lost_task();
        }
        result.finish(started_at, Utc::now());

        info!(
            "Batch {} finished: {} processed | {} stakes | {} compounds | {} errors in {:.1}s",
            batch_number,
            result.processed_count,
            result.successful_stakes,
            result.successful_compounds,
            result.error_count,
            result.timing.duration.as_secs_f64()
        );

        result
    }
}
