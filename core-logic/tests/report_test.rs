use chrono::{Local, TimeZone};
use core_logic::batch::WalletFailure;
use core_logic::{
    BatchReport, BatchResult, Credential, ReportAssembler, ReportError, SecretKey,
    WalletOutcome, WalletResult, WalletStatus,
};

fn completed(n: usize, stake: f64) -> WalletOutcome {
    let credential = Credential {
        id: format!("main_wallets_{}", n),
        address: format!("0xwallet{:02}", n),
        secret: SecretKey::new("0xdeadbeef"),
        source_file: "main_wallets.txt".to_string(),
        line_number: n,
    };
    let mut result = WalletResult::pending(&credential);
    result.status = WalletStatus::Completed;
    result.initial_balance = stake / 0.8;
    result.stake_tx = Some(format!("0xstake{}", n));
    result.stake_amount = stake;
    WalletOutcome::Completed(result)
}

fn failed(n: usize) -> WalletOutcome {
    let credential = Credential {
        id: format!("main_wallets_{}", n),
        address: format!("0xwallet{:02}", n),
        secret: SecretKey::new("0xdeadbeef"),
        source_file: "main_wallets.txt".to_string(),
        line_number: n,
    };
    let mut partial = WalletResult::pending(&credential);
    partial.status = WalletStatus::Error;
    partial.error = Some("rpc down".to_string());
    WalletOutcome::Failed(WalletFailure {
        wallet_id: credential.id,
        message: "rpc down".to_string(),
        partial,
    })
}

fn sample_result(batch_number: usize, stakes: &[f64]) -> BatchResult {
    let mut result = BatchResult::new(batch_number);
    for (i, stake) in stakes.iter().enumerate() {
        result.record(completed(i + 1, *stake));
    }
    result.record(failed(stakes.len() + 1));
    result
}

fn read_report(path: &std::path::Path) -> BatchReport {
    let raw = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_latest_tracks_most_recent_write() {
    let dir = tempfile::tempdir().unwrap();
    let assembler = ReportAssembler::new(dir.path().join("reports"));

    let first_at = Local.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
    let second_at = Local.with_ymd_and_hms(2025, 3, 1, 10, 5, 0).unwrap();

    let first = assembler
        .persist_at(&sample_result(1, &[1.6]), first_at)
        .await
        .unwrap();
    let second = assembler
        .persist_at(&sample_result(1, &[1.6, 4.0]), second_at)
        .await
        .unwrap();

    assert_ne!(first.historical, second.historical);
    assert_eq!(first.latest, second.latest);
    assert!(first.historical.ends_with("batch_1_20250301_100000.json"));
    assert!(second.latest.ends_with("batch_1_latest.json"));

    let historical: Vec<_> = std::fs::read_dir(assembler.reports_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name != "batch_1_latest.json")
        .collect();
    assert_eq!(historical.len(), 2);

    let latest = read_report(&second.latest);
    assert_eq!(latest, read_report(&second.historical));
    assert_eq!(latest.summary.wallets_processed, 3);
    assert_eq!(latest.summary.successful_stakes, 2);
    assert_eq!(latest.summary.errors, 1);
    assert!((latest.summary.total_staked - 5.6).abs() < 1e-9);
}

#[tokio::test]
async fn test_same_second_writes_do_not_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let assembler = ReportAssembler::new(dir.path());
    let at = Local.with_ymd_and_hms(2025, 3, 1, 12, 30, 15).unwrap();

    let first = assembler
        .persist_at(&sample_result(2, &[2.0]), at)
        .await
        .unwrap();
    let second = assembler
        .persist_at(&sample_result(2, &[3.0]), at)
        .await
        .unwrap();

    assert!(first.historical.ends_with("batch_2_20250301_123015.json"));
    assert!(second.historical.ends_with("batch_2_20250301_123015_1.json"));
    assert!(first.historical.exists());
    assert!(second.historical.exists());
}

#[tokio::test]
async fn test_report_content_matches_result() {
    let dir = tempfile::tempdir().unwrap();
    let assembler = ReportAssembler::new(dir.path());
    let result = sample_result(3, &[1.0, 2.0]);

    let paths = assembler.persist(&result).await.unwrap();
    let report = read_report(&paths.historical);

    assert_eq!(report.batch_number, 3);
    assert_eq!(report.transactions.len(), 2);
    assert_eq!(report.transactions[0].wallet_id, "main_wallets_1");
    assert_eq!(report.wallet_details.len(), 2);
    assert_eq!(report.wallet_details[1].status, WalletStatus::Completed);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&paths.latest).unwrap()).unwrap();
    assert_eq!(raw["wallet_details"][0]["status"], "completed");
    assert!(raw["wallet_details"][0].get("secret").is_none());
    assert!(raw["timestamp"].as_str().is_some());
}

#[tokio::test]
async fn test_unwritable_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "occupied").unwrap();

    let assembler = ReportAssembler::new(blocker.join("reports"));
    let result = sample_result(1, &[1.6]);

    let err = assembler.assemble(&result).await.unwrap_err();
    assert!(matches!(err, ReportError::CreateDir { .. }));

    // the in-memory result is untouched by the failed write
    assert_eq!(result.processed_count, 2);
    assert_eq!(result.successful_stakes, 1);
}
