use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps how many wallet tasks run at once.
///
/// Slots are handed out as [`LimiterSlot`] guards; dropping the guard frees
/// the slot, so a task releases it on every exit path.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// Held for the lifetime of one wallet task.
#[derive(Debug)]
pub struct LimiterSlot {
    _permit: OwnedSemaphorePermit,
}

impl ConcurrencyLimiter {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits until a slot is free.
    pub async fn acquire(&self) -> Result<LimiterSlot> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .context("Concurrency limiter closed")?;
        Ok(LimiterSlot { _permit: permit })
    }
}
