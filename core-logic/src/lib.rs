//! # Core Logic - Batch Execution Engine for Multi-Wallet Bots
//!
//! This crate holds everything that is not chain specific: loading wallet
//! credentials, slicing them into batches, running each wallet's operation
//! sequence under a concurrency cap, and reporting the aggregate.
//!
//! ## Modules
//!
//! - [`batch`] - Partitioner, limiter, task runner and coordinator
//! - [`config`] - Engine knobs and batch selection
//! - [`error`] - Typed error handling with thiserror
//! - [`metrics`] - Wallet and provider call metrics
//! - [`report`] - JSON report persistence and console summary
//! - [`traits`] - Operation provider and address derivation seams
//! - `utils` - Logger, retry policy, wallet file loading

// Module declarations - internal modules marked pub(crate)
pub mod batch;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod traits;
pub(crate) mod utils;

// Selective exports - only public API types
pub use batch::{
    BatchCoordinator, BatchResult, ConcurrencyLimiter, Credential, SecretKey, TransactionSummary,
    WalletOutcome, WalletResult, WalletStatus, WalletTaskRunner,
};
pub use config::{BatchSelection, BridgePolicy, EngineConfig};
pub use error::{ConfigError, CoreError, NetworkError, ReportError, WalletError};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use report::{BatchReport, ReportAssembler, ReportPaths};
pub use traits::{AddressDeriver, OperationProvider, WalletState};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{
    normalize_private_key, setup_logger, with_retry, RetryConfig, WalletManager,
    WALLET_RESULT_TARGET,
};
