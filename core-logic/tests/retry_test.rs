use core_logic::{with_retry, RetryConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_retry_success_first_try() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(&config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("success".to_string())
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_success_after_failures() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(&config, "test_op", || async {
        let count = counter.fetch_add(1, Ordering::SeqCst) + 1;
        if count < 3 {
            Err(anyhow::anyhow!("temporary error"))
        } else {
            Ok("success".to_string())
        }
    })
    .await;

    assert!(result.is_ok());
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retry_stops_after_max_attempts() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 10);

    let result: Result<String, anyhow::Error> = with_retry(&config, "get_balance", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(anyhow::anyhow!("connection refused"))
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(counter.load(Ordering::SeqCst), 3);
    let rendered = format!("{:#}", err);
    assert!(rendered.contains("get_balance failed after 3 attempts"));
    assert!(rendered.contains("connection refused"));
}

#[tokio::test]
async fn test_retry_with_delay() {
    let counter = Arc::new(AtomicUsize::new(0));
    let config = RetryConfig::new(3, 50);

    let start = tokio::time::Instant::now();
    let _: Result<String, anyhow::Error> = with_retry(&config, "test_op", || async {
        counter.fetch_add(1, Ordering::SeqCst);
        if counter.load(Ordering::SeqCst) < 3 {
            Err(anyhow::anyhow!("temp"))
        } else {
            Ok("done".to_string())
        }
    })
    .await;

    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(150));
}

#[test]
fn test_default_backoff_is_clamped() {
    let config = RetryConfig::default();

    assert_eq!(config.max_attempts, 3);
    assert_eq!(config.calculate_delay(0), Duration::from_secs(4));
    assert_eq!(config.calculate_delay(2), Duration::from_secs(4));
    assert_eq!(config.calculate_delay(3), Duration::from_secs(8));
    assert_eq!(config.calculate_delay(4), Duration::from_secs(10));
    assert_eq!(config.calculate_delay(10), Duration::from_secs(10));
}

#[test]
fn test_jitter_stays_within_bounds() {
    let config = RetryConfig::default().with_jitter(true);
    for attempt in 0..6 {
        let delay = config.calculate_delay(attempt);
        assert!(delay >= Duration::from_secs(4));
        assert!(delay <= Duration::from_secs(10));
    }
}
