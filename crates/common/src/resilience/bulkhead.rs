//! Bulkhead pattern for limiting concurrent operations
//!
//! The bulkhead acts as a counting admission gate: a permit is acquired
//! before the operation starts and released once it has finished, whatever
//! the outcome. Callers that exceed the limit wait for a free permit; there
//! is no queue cap and no acquire timeout.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use super::ResilienceError;

/// Metrics for bulkhead monitoring
#[derive(Debug, Clone)]
pub struct BulkheadMetrics {
    /// Operations that obtained a permit
    pub total_operations: u64,
    /// Operations that returned an error
    pub failed_operations: u64,
    /// Current number of concurrent operations
    pub current_concurrent: usize,
    /// Highest number of operations observed in flight at once
    pub peak_concurrent: usize,
    /// Maximum concurrent operations allowed
    pub max_concurrent: usize,
}

/// Bulkhead for limiting concurrent operations
///
/// Clones share the same permits and counters, so a clone can be moved into
/// each spawned task.
///
/// # Examples
///
/// ```rust
/// use calpurge_common::resilience::Bulkhead;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bulkhead = Bulkhead::with_limit(3);
///
/// let result = bulkhead.execute(|| async { Ok::<_, std::io::Error>("Success") }).await?;
/// # Ok(())
/// # }
/// ```
pub struct Bulkhead {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    peak_concurrent: Arc<AtomicUsize>,
    total_operations: Arc<AtomicU64>,
    failed_operations: Arc<AtomicU64>,
}

impl Bulkhead {
    /// Bulkhead admitting `max_concurrent` operations at once (at least one)
    pub fn with_limit(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_concurrent: Arc::new(AtomicUsize::new(0)),
            total_operations: Arc::new(AtomicU64::new(0)),
            failed_operations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Execute an operation with bulkhead protection
    ///
    /// Waits for a permit, runs the operation, and releases the permit when
    /// the operation's future completes (or is dropped).
    #[instrument(skip(self, operation), fields(concurrent = self.current_concurrent()))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, ResilienceError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ResilienceError::Closed { capacity: self.max_concurrent })?;
        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_concurrent);

        self.total_operations.fetch_add(1, Ordering::Relaxed);
        debug!("Bulkhead: executing operation ({} concurrent)", self.current_concurrent());

        match operation().await {
            Ok(result) => Ok(result),
            Err(error) => {
                self.failed_operations.fetch_add(1, Ordering::Relaxed);
                Err(ResilienceError::OperationFailed { source: error })
            }
        }
    }

    /// Get the current number of concurrent operations
    pub fn current_concurrent(&self) -> usize {
        self.max_concurrent.saturating_sub(self.semaphore.available_permits())
    }

    /// Highest number of operations seen running at once
    pub fn peak_concurrent(&self) -> usize {
        self.peak_concurrent.load(Ordering::Acquire)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Get bulkhead metrics
    pub fn metrics(&self) -> BulkheadMetrics {
        BulkheadMetrics {
            total_operations: self.total_operations.load(Ordering::Acquire),
            failed_operations: self.failed_operations.load(Ordering::Acquire),
            current_concurrent: self.current_concurrent(),
            peak_concurrent: self.peak_concurrent(),
            max_concurrent: self.max_concurrent,
        }
    }
}

impl Clone for Bulkhead {
    fn clone(&self) -> Self {
        Self {
            max_concurrent: self.max_concurrent,
            semaphore: Arc::clone(&self.semaphore),
            in_flight: Arc::clone(&self.in_flight),
            peak_concurrent: Arc::clone(&self.peak_concurrent),
            total_operations: Arc::clone(&self.total_operations),
            failed_operations: Arc::clone(&self.failed_operations),
        }
    }
}

impl fmt::Debug for Bulkhead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bulkhead")
            .field("max_concurrent", &self.max_concurrent)
            .field("current_concurrent", &self.current_concurrent())
            .field("peak_concurrent", &self.peak_concurrent())
            .finish()
    }
}

/// Keeps the in-flight counter accurate even if the operation is dropped.
struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::AcqRel) + 1;
        peak.fetch_max(now, Ordering::AcqRel);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}
