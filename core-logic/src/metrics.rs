use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub timestamp: String,
    pub wallets: WalletMetrics,
    pub performance: PerformanceMetrics,
    pub provider: ProviderMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalletMetrics {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceMetrics {
    pub total_duration_ms: u64,
    pub avg_wallet_duration_ms: f64,
    pub min_wallet_duration_ms: u64,
    pub max_wallet_duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderMetrics {
    pub total_calls: u64,
    pub avg_latency_ms: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

/// Lock-free counters shared by every wallet task of a run.
#[derive(Debug)]
pub struct MetricsCollector {
    wallets_total: AtomicU64,
    wallets_success: AtomicU64,
    wallets_failed: AtomicU64,
    wallet_duration_sum_ms: AtomicU64,
    wallet_min_duration_ms: AtomicU64,
    wallet_max_duration_ms: AtomicU64,
    provider_calls: AtomicU64,
    provider_latency_sum_ms: AtomicU64,
    provider_min_latency_ms: AtomicU64,
    provider_max_latency_ms: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            wallets_total: AtomicU64::new(0),
            wallets_success: AtomicU64::new(0),
            wallets_failed: AtomicU64::new(0),
            wallet_duration_sum_ms: AtomicU64::new(0),
            wallet_min_duration_ms: AtomicU64::new(u64::MAX),
            wallet_max_duration_ms: AtomicU64::new(0),
            provider_calls: AtomicU64::new(0),
            provider_latency_sum_ms: AtomicU64::new(0),
            provider_min_latency_ms: AtomicU64::new(u64::MAX),
            provider_max_latency_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_wallet(&self, duration: Duration, success: bool) {
        let duration_ms = duration.as_millis() as u64;

        self.wallets_total.fetch_add(1, Ordering::SeqCst);
        self.wallet_duration_sum_ms
            .fetch_add(duration_ms, Ordering::SeqCst);
        self.wallet_min_duration_ms
            .fetch_min(duration_ms, Ordering::SeqCst);
        self.wallet_max_duration_ms
            .fetch_max(duration_ms, Ordering::SeqCst);

        if success {
            self.wallets_success.fetch_add(1, Ordering::SeqCst);
        } else {
            self.wallets_failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_provider_call(&self, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;

        self.provider_calls.fetch_add(1, Ordering::SeqCst);
        self.provider_latency_sum_ms
            .fetch_add(latency_ms, Ordering::SeqCst);
        self.provider_min_latency_ms
            .fetch_min(latency_ms, Ordering::SeqCst);
        self.provider_max_latency_ms
            .fetch_max(latency_ms, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_wallets = self.wallets_total.load(Ordering::SeqCst);
        let total_duration = self.wallet_duration_sum_ms.load(Ordering::SeqCst);
        let min_duration = self.wallet_min_duration_ms.load(Ordering::SeqCst);
        let max_duration = self.wallet_max_duration_ms.load(Ordering::SeqCst);

        let calls = self.provider_calls.load(Ordering::SeqCst);
        let latency = self.provider_latency_sum_ms.load(Ordering::SeqCst);
        let min_latency = self.provider_min_latency_ms.load(Ordering::SeqCst);
        let max_latency = self.provider_max_latency_ms.load(Ordering::SeqCst);

        let total_success = self.wallets_success.load(Ordering::SeqCst);

        MetricsSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            wallets: WalletMetrics {
                total: total_wallets,
                success: total_success,
                failed: self.wallets_failed.load(Ordering::SeqCst),
                success_rate: if total_wallets > 0 {
                    total_success as f64 / total_wallets as f64 * 100.0
                } else {
                    0.0
                },
            },
            performance: PerformanceMetrics {
                total_duration_ms: total_duration,
                avg_wallet_duration_ms: if total_wallets > 0 {
                    total_duration as f64 / total_wallets as f64
                } else {
                    0.0
                },
                min_wallet_duration_ms: if min_duration == u64::MAX {
                    0
                } else {
                    min_duration
                },
                max_wallet_duration_ms: max_duration,
            },
            provider: ProviderMetrics {
                total_calls: calls,
                avg_latency_ms: if calls > 0 {
                    latency as f64 / calls as f64
                } else {
                    0.0
                },
                min_latency_ms: if min_latency == u64::MAX { 0 } else { min_latency },
                max_latency_ms: max_latency,
            },
        }
    }

    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    pub async fn export_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = self.to_json();
        tokio::fs::write(path, json).await
    }

    pub fn wallets_total(&self) -> u64 {
        self.wallets_total.load(Ordering::SeqCst)
    }

    pub fn wallets_success(&self) -> u64 {
        self.wallets_success.load(Ordering::SeqCst)
    }

    pub fn wallets_failed(&self) -> u64 {
        self.wallets_failed.load(Ordering::SeqCst)
    }

    pub fn provider_calls(&self) -> u64 {
        self.provider_calls.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_metrics_collector() {
        let metrics = MetricsCollector::default();

        metrics.record_wallet(Duration::from_millis(100), true);
        metrics.record_wallet(Duration::from_millis(200), true);
        metrics.record_wallet(Duration::from_millis(150), false);

        assert_eq!(metrics.wallets_total(), 3);
        assert_eq!(metrics.wallets_success(), 2);
        assert_eq!(metrics.wallets_failed(), 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.wallets.total, 3);
        assert!((snapshot.wallets.success_rate - 66.67).abs() < 0.1);
        assert_eq!(snapshot.performance.min_wallet_duration_ms, 100);
        assert_eq!(snapshot.performance.max_wallet_duration_ms, 200);
    }

    #[tokio::test]
    async fn test_json_export() {
        let metrics = MetricsCollector::default();
        metrics.record_wallet(Duration::from_millis(100), true);
        metrics.record_provider_call(Duration::from_millis(20));

        let json = metrics.to_json();
        assert!(json.contains("wallets"));
        assert!(json.contains("provider"));
    }

    #[test]
    fn test_empty_snapshot_has_zero_minimums() {
        let snapshot = MetricsCollector::new().snapshot();
        assert_eq!(snapshot.performance.min_wallet_duration_ms, 0);
        assert_eq!(snapshot.provider.min_latency_ms, 0);
    }
}
