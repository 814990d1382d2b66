//! Bounded permit pool for concurrent yt-dlp executions.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{Error, Result};

/// Counting permit pool with a capacity fixed at construction
///
/// A permit is an [`OwnedSemaphorePermit`]; dropping it releases the slot, so
/// release happens exactly once on every exit path of the holder.
#[derive(Clone, Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter with `capacity` permits
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `capacity` is 0 or exceeds
    /// [`Semaphore::MAX_PERMITS`].
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || capacity > Semaphore::MAX_PERMITS {
            return Err(Error::Config {
                message: format!(
                    "max_parallel must be between 1 and {}, got {}",
                    Semaphore::MAX_PERMITS,
                    capacity
                ),
                key: Some("max_parallel".to_string()),
            });
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        })
    }

    /// Wait until a permit is free and take it
    ///
    /// Waiters are served in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShuttingDown`] once the limiter has been closed.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::ShuttingDown)
    }

    /// Total number of permits
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Refuse all pending and future acquisitions
    ///
    /// Permits already handed out stay valid until dropped.
    pub fn close(&self) {
        self.semaphore.close();
    }

    /// Whether [`close`](Self::close) has been called
    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}
