//! Shared test helpers for `calpurge-core` integration tests.

#![allow(dead_code)]

pub mod provider;

use std::sync::Arc;

use calpurge_common::resilience::NoDelay;
use calpurge_core::{BoundedPurgeExecutor, EventEnumerator};
use calpurge_domain::{resolve_time_window, TimeWindow};

pub use provider::{InMemoryCalendar, RecordingObserver, StaticTokens};

pub fn utc_day() -> TimeWindow {
    resolve_time_window("2023-01-01 00:00", "2023-01-02 00:00", "UTC").expect("valid window")
}

/// Enumerator without page pauses
pub fn fast_enumerator(cap: usize) -> EventEnumerator {
    EventEnumerator::new(Arc::new(NoDelay), cap)
}

/// Executor with the production limit of three and no pause
pub fn fast_executor() -> BoundedPurgeExecutor {
    BoundedPurgeExecutor::new(3, Arc::new(NoDelay))
}
