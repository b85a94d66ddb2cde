use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Private key material. Wiped on drop, never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***REDACTED***")
    }
}

/// One wallet loaded from a credential file. Immutable after loading.
#[derive(Debug, Clone)]
pub struct Credential {
    pub id: String,
    pub address: String,
    pub secret: SecretKey,
    pub source_file: String,
    pub line_number: usize,
}

impl Credential {
    /// Address shortened for log lines.
    pub fn short_address(&self) -> &str {
        let end = self.address.len().min(10);
        self.address.get(..end).unwrap_or(&self.address)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletStatus {
    Pending,
    Completed,
    Error,
}

/// Per-wallet record produced by the task runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletResult {
    pub wallet_id: String,
    pub address: String,
    pub source_file: String,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub pending_rewards: f64,
    pub stake_tx: Option<String>,
    pub compound_tx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_tx: Option<String>,
    pub stake_amount: f64,
    pub compound_amount: f64,
    #[serde(default)]
    pub bridge_amount: f64,
    pub status: WalletStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WalletResult {
    pub fn pending(credential: &Credential) -> Self {
        Self {
            wallet_id: credential.id.clone(),
            address: credential.address.clone(),
            source_file: credential.source_file.clone(),
            initial_balance: 0.0,
            final_balance: 0.0,
            pending_rewards: 0.0,
            stake_tx: None,
            compound_tx: None,
            bridge_tx: None,
            stake_amount: 0.0,
            compound_amount: 0.0,
            bridge_amount: 0.0,
            status: WalletStatus::Pending,
            error: None,
        }
    }

    pub fn has_transaction(&self) -> bool {
        self.stake_tx.is_some() || self.compound_tx.is_some() || self.bridge_tx.is_some()
    }
}

/// Failure captured while running one wallet's sequence.
#[derive(Debug, Clone)]
pub struct WalletFailure {
    pub wallet_id: String,
    pub message: String,
    /// Whatever the runner had filled in before failing, marked `Error`.
    pub partial: WalletResult,
}

impl fmt::Display for WalletFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wallet {} failed: {}", self.wallet_id, self.message)
    }
}

/// Terminal state of one wallet task.
#[derive(Debug, Clone)]
pub enum WalletOutcome {
    Completed(WalletResult),
    Failed(WalletFailure),
}

impl WalletOutcome {
    pub fn wallet_id(&self) -> &str {
        match self {
            WalletOutcome::Completed(result) => &result.wallet_id,
            WalletOutcome::Failed(failure) => &failure.wallet_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, WalletOutcome::Completed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub wallet_id: String,
    pub stake_tx: Option<String>,
    pub compound_tx: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_tx: Option<String>,
    pub stake_amount: f64,
    pub compound_amount: f64,
    #[serde(default)]
    pub bridge_amount: f64,
}

impl From<&WalletResult> for TransactionSummary {
    fn from(result: &WalletResult) -> Self {
        Self {
            wallet_id: result.wallet_id.clone(),
            stake_tx: result.stake_tx.clone(),
            compound_tx: result.compound_tx.clone(),
            bridge_tx: result.bridge_tx.clone(),
            stake_amount: result.stake_amount,
            compound_amount: result.compound_amount,
            bridge_amount: result.bridge_amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchTiming {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: Duration,
}

/// Aggregate of every wallet outcome in one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub batch_number: usize,
    pub processed_count: usize,
    pub successful_stakes: usize,
    pub successful_compounds: usize,
    pub successful_bridges: usize,
    pub total_staked: f64,
    pub total_compounded: f64,
    pub total_bridged: f64,
    pub error_count: usize,
    pub transactions: Vec<TransactionSummary>,
    pub wallet_details: Vec<WalletResult>,
    pub timing: BatchTiming,
}

impl BatchResult {
    pub fn new(batch_number: usize) -> Self {
        let now = Utc::now();
        Self {
            batch_number,
            processed_count: 0,
            successful_stakes: 0,
            successful_compounds: 0,
            successful_bridges: 0,
            total_staked: 0.0,
            total_compounded: 0.0,
            total_bridged: 0.0,
            error_count: 0,
            transactions: Vec::new(),
            wallet_details: Vec::new(),
            timing: BatchTiming {
                started_at: now,
                finished_at: now,
                duration: Duration::ZERO,
            },
        }
    }

    /// Folds one terminal wallet outcome into the aggregate.
    pub fn record(&mut self, outcome: WalletOutcome) {
        self.processed_count += 1;

        let result = match outcome {
            WalletOutcome::Failed(_) => {
                self.error_count += 1;
                return;
            }
            WalletOutcome::Completed(result) => result,
        };

        if result.stake_tx.is_some() {
            self.successful_stakes += 1;
            self.total_staked += result.stake_amount.max(0.0);
        }
        if result.compound_tx.is_some() {
            self.successful_compounds += 1;
            self.total_compounded += result.compound_amount.max(0.0);
        }
        if result.bridge_tx.is_some() {
            self.successful_bridges += 1;
            self.total_bridged += result.bridge_amount.max(0.0);
        }
        if result.has_transaction() {
            self.transactions.push(TransactionSummary::from(&result));
        }

        self.wallet_details.push(result);
    }

    /// Counts a task that never produced an outcome (panicked or aborted).
    pub fn record_lost_task(&mut self) {
        self.processed_count += 1;
        self.error_count += 1;
    }

    pub fn finish(&mut self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) {
        self.timing = BatchTiming {
            started_at,
            finished_at,
            duration: (finished_at - started_at).to_std().unwrap_or(Duration::ZERO),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed(id: &str, stake: Option<(&str, f64)>, compound: Option<(&str, f64)>) -> WalletOutcome {
        let mut result = WalletResult {
            wallet_id: id.to_string(),
            address: format!("0x{}", id),
            source_file: "main_wallets.txt".to_string(),
            initial_balance: 0.0,
            final_balance: 0.0,
            pending_rewards: 0.0,
            stake_tx: None,
            compound_tx: None,
            bridge_tx: None,
            stake_amount: 0.0,
            compound_amount: 0.0,
            bridge_amount: 0.0,
            status: WalletStatus::Completed,
            error: None,
        };
        if let Some((tx, amount)) = stake {
            result.stake_tx = Some(tx.to_string());
            result.stake_amount = amount;
        }
        if let Some((tx, amount)) = compound {
            result.compound_tx = Some(tx.to_string());
            result.compound_amount = amount;
        }
        WalletOutcome::Completed(result)
    }

    fn failed(id: &str) -> WalletOutcome {
        let credential = Credential {
            id: id.to_string(),
            address: "0xdead".to_string(),
            secret: SecretKey::new("0x00"),
            source_file: "main_wallets.txt".to_string(),
            line_number: 1,
        };
        let mut partial = WalletResult::pending(&credential);
        partial.status = WalletStatus::Error;
        partial.error = Some("rpc down".to_string());
        WalletOutcome::Failed(WalletFailure {
            wallet_id: id.to_string(),
            message: "rpc down".to_string(),
            partial,
        })
    }

    #[test]
    fn test_record_counts_stakes_and_compounds() {
        let mut batch = BatchResult::new(1);
        batch.record(completed("a", Some(("0x1", 1.6)), None));
        batch.record(completed("b", None, Some(("0x2", 0.5))));
        batch.record(completed("c", None, None));

        assert_eq!(batch.processed_count, 3);
        assert_eq!(batch.successful_stakes, 1);
        assert_eq!(batch.successful_compounds, 1);
        assert!((batch.total_staked - 1.6).abs() < 1e-9);
        assert!((batch.total_compounded - 0.5).abs() < 1e-9);
        assert_eq!(batch.transactions.len(), 2);
        assert_eq!(batch.wallet_details.len(), 3);
        assert_eq!(batch.error_count, 0);
    }

    #[test]
    fn test_failure_adds_no_wallet_details() {
        let mut batch = BatchResult::new(2);
        batch.record(failed("x"));
        batch.record(completed("y", Some(("0x3", 2.0)), None));

        assert_eq!(batch.processed_count, 2);
        assert_eq!(batch.error_count, 1);
        assert_eq!(batch.wallet_details.len(), 1);
        assert_eq!(batch.wallet_details[0].wallet_id, "y");
    }

    #[test]
    fn test_stake_amount_without_tx_is_ignored() {
        let mut batch = BatchResult::new(1);
        let mut outcome = completed("a", None, None);
        if let WalletOutcome::Completed(ref mut result) = outcome {
            result.stake_amount = 5.0;
        }
        batch.record(outcome);

        assert_eq!(batch.total_staked, 0.0);
        assert_eq!(batch.successful_stakes, 0);
        assert!(batch.transactions.is_empty());
    }

    #[test]
    fn test_totals_independent_of_order() {
        let outcomes = vec![
            completed("a", Some(("0x1", 1.25)), None),
            failed("b"),
            completed("c", Some(("0x2", 3.5)), Some(("0x3", 0.2))),
            completed("d", Some(("0x4", 0.75)), None),
        ];

        let mut forward = BatchResult::new(1);
        for outcome in outcomes.iter().cloned() {
            forward.record(outcome);
        }
        let mut backward = BatchResult::new(1);
        for outcome in outcomes.into_iter().rev() {
            backward.record(outcome);
        }

        assert!((forward.total_staked - backward.total_staked).abs() < 1e-9);
        assert!((forward.total_staked - 5.5).abs() < 1e-9);
        assert_eq!(forward.successful_stakes, backward.successful_stakes);
        assert_eq!(forward.error_count, backward.error_count);
    }

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let credential = Credential {
            id: "main_wallets_1".to_string(),
            address: "0xabc".to_string(),
            secret: SecretKey::new("0xsupersecret"),
            source_file: "main_wallets.txt".to_string(),
            line_number: 1,
        };
        let printed = format!("{:?}", credential);
        assert!(!printed.contains("supersecret"));
        assert!(printed.contains("REDACTED"));
    }
}
