//! # Batch Execution Engine
//!
//! Partition the credential set, run each wallet's operation sequence under
//! a concurrency cap, and fold the outcomes into one [`BatchResult`].
//!
//! - [`partition`] - deterministic batch slicing
//! - [`limiter`] - bounded slot pool for wallet tasks
//! - [`runner`] - the per-wallet stake / compound / bridge sequence
//! - [`coordinator`] - fan-out, join barrier and aggregation

pub mod coordinator;
pub mod limiter;
pub mod partition;
pub mod runner;
pub mod types;

pub use coordinator::BatchCoordinator;
pub use limiter::{ConcurrencyLimiter, LimiterSlot};
pub use partition::{batch_bounds, chunk_by_size, select_batch, BatchBounds};
pub use runner::WalletTaskRunner;
pub use types::{
    BatchResult, BatchTiming, Credential, SecretKey, TransactionSummary, WalletFailure,
    WalletOutcome, WalletResult, WalletStatus,
};
