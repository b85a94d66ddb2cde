//! # Batch Reports
//!
//! Persists a finished [`BatchResult`] as a timestamped historical JSON file
//! plus a `batch_{n}_latest.json` copy, and renders the console summary.

use crate::batch::{BatchResult, TransactionSummary, WalletResult};
use crate::error::ReportError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Transactions listed in the console summary.
const SUMMARY_RECENT_TX: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub wallets_processed: usize,
    pub successful_stakes: usize,
    pub successful_compounds: usize,
    pub successful_bridges: usize,
    pub total_staked: f64,
    pub total_compounded: f64,
    pub total_bridged: f64,
    pub errors: usize,
    pub execution_time: String,
}

/// Serialized form of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_number: usize,
    pub timestamp: String,
    pub start_time: String,
    pub end_time: String,
    pub summary: ReportSummary,
    pub transactions: Vec<TransactionSummary>,
    pub wallet_details: Vec<WalletResult>,
}

impl BatchReport {
    pub fn from_result(result: &BatchResult, generated_at: DateTime<Local>) -> Self {
        Self {
            batch_number: result.batch_number,
            timestamp: generated_at.to_rfc3339(),
            start_time: result.timing.started_at.to_rfc3339(),
            end_time: result.timing.finished_at.to_rfc3339(),
            summary: ReportSummary {
                wallets_processed: result.processed_count,
                successful_stakes: result.successful_stakes,
                successful_compounds: result.successful_compounds,
                successful_bridges: result.successful_bridges,
                total_staked: result.total_staked,
                total_compounded: result.total_compounded,
                total_bridged: result.total_bridged,
                errors: result.error_count,
                execution_time: format_duration(result.timing.duration),
            },
            transactions: result.transactions.clone(),
            wallet_details: result.wallet_details.clone(),
        }
    }
}

/// Where a report landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub historical: PathBuf,
    pub latest: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReportAssembler {
    reports_dir: PathBuf,
}

impl ReportAssembler {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Prints the summary, then writes both report files.
    ///
    /// The summary is printed even when writing fails.
    pub async fn assemble(&self, result: &BatchResult) -> Result<ReportPaths, ReportError> {
        print_summary(result);
        self.persist(result).await
    }

    pub async fn persist(&self, result: &BatchResult) -> Result<ReportPaths, ReportError> {
        self.persist_at(result, Local::now()).await
    }

    pub async fn persist_at(
        &self,
        result: &BatchResult,
        generated_at: DateTime<Local>,
    ) -> Result<ReportPaths, ReportError> {
        tokio::fs::create_dir_all(&self.reports_dir)
            .await
            .map_err(|source| ReportError::CreateDir {
                path: self.reports_dir.display().to_string(),
                source,
            })?;

        let report = BatchReport::from_result(result, generated_at);
        let payload = serde_json::to_string_pretty(&report)?;

        let stamp = generated_at.format("%Y%m%d_%H%M%S").to_string();
        let historical = self.unused_historical_path(result.batch_number, &stamp).await;
        let latest = self
            .reports_dir
            .join(format!("batch_{}_latest.json", result.batch_number));

        write_file(&historical, &payload).await?;
        write_file(&latest, &payload).await?;

        info!("Report saved: {}", historical.display());

        Ok(ReportPaths { historical, latest })
    }

    async fn unused_historical_path(&self, batch_number: usize, stamp: &str) -> PathBuf {
        let base = self
            .reports_dir
            .join(format!("batch_{}_{}.json", batch_number, stamp));
        if !path_exists(&base).await {
            return base;
        }

        let mut suffix = 1usize;
        loop {
            let candidate = self
                .reports_dir
                .join(format!("batch_{}_{}_{}.json", batch_number, stamp, suffix));
            if !path_exists(&candidate).await {
                return candidate;
            }
            suffix += 1;
        }
    }
}

async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn write_file(path: &Path, payload: &str) -> Result<(), ReportError> {
    tokio::fs::write(path, payload)
        .await
        .map_err(|source| ReportError::Write {
            path: path.display().to_string(),
            source,
        })
}

/// `H:MM:SS.mmm`
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms / 60_000) % 60;
    let seconds = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

pub fn render_summary(result: &BatchResult) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "BATCH {} SUMMARY", result.batch_number);
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "Wallets Processed:    {}", result.processed_count);
    let _ = writeln!(out, "Successful Stakes:    {}", result.successful_stakes);
    let _ = writeln!(out, "Successful Compounds: {}", result.successful_compounds);
    if result.successful_bridges > 0 {
        let _ = writeln!(out, "Successful Bridges:   {}", result.successful_bridges);
    }
    let _ = writeln!(out, "Total Staked:         {:.4}", result.total_staked);
    let _ = writeln!(out, "Total Compounded:     {:.4}", result.total_compounded);
    if result.successful_bridges > 0 {
        let _ = writeln!(out, "Total Bridged:        {:.4}", result.total_bridged);
    }
    let _ = writeln!(out, "Errors:               {}", result.error_count);
    let _ = writeln!(
        out,
        "Execution Time:       {}",
        format_duration(result.timing.duration)
    );

    if !result.transactions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recent Transactions:");
        let skip = result.transactions.len().saturating_sub(SUMMARY_RECENT_TX);
        for tx in result.transactions.iter().skip(skip) {
            let _ = writeln!(
                out,
                "  - {}: stake={:.4} compound={:.4}",
                tx.wallet_id, tx.stake_amount, tx.compound_amount
            );
        }
    }

    let _ = writeln!(out, "{}", rule);
    out
}

pub fn print_summary(result: &BatchResult) {
    println!("{}", render_summary(result));
}
