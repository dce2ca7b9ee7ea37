//! Resilience patterns for pacing outbound calls
//!
//! This module provides **generic, reusable** building blocks:
//! - **Bulkhead**: caps the number of operations in flight at once
//! - **Throttle**: pacing strategy applied between calls (fixed delay or none)
//!
//! Neither pattern retries. A failed operation is handed back to the caller
//! untouched so it can be recorded or surfaced.

use thiserror::Error;

pub mod bulkhead;
pub mod throttle;

pub use bulkhead::{Bulkhead, BulkheadMetrics};
pub use throttle::{FixedDelay, NoDelay, Throttle};

/// Errors produced by resilience wrappers
#[derive(Debug, Error)]
pub enum ResilienceError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// The gate stopped handing out permits
    #[error("Bulkhead closed, {capacity} permits no longer available")]
    Closed { capacity: usize },

    /// The underlying operation failed
    #[error("Operation failed")]
    OperationFailed {
        #[source]
        source: E,
    },
}
