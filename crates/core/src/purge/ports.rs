//! Port interfaces for the purge pipeline
//!
//! These traits define the boundaries between the pipeline and the
//! provider adapters, credential handling and console output.

use async_trait::async_trait;
use calpurge_domain::{DeleteResponse, EventBatch, EventPage, EventRef, PurgeOutcome, Result,
    TimeWindow};

/// One calendar provider's listing and delete endpoints
///
/// Implementations attach a bearer credential to every call.
#[async_trait]
pub trait CalendarProviderClient: Send + Sync {
    /// Fetch one page of events inside `window`
    ///
    /// `cursor` is the `next_cursor` of the previous page, `None` for the
    /// first page. A non-success response is `CalPurgeError::Enumeration`.
    async fn list_events(&self, window: &TimeWindow, cursor: Option<&str>) -> Result<EventPage>;

    /// Issue one delete request
    ///
    /// Any HTTP answer, success or not, is `Ok`; `Err` means no response was
    /// received at all.
    async fn delete_event(&self, event_id: &str) -> Result<DeleteResponse>;

    /// Short provider label for logs
    fn provider_name(&self) -> &str;
}

/// Supplies the bearer credential, refreshing or prompting as needed
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// Progress callbacks, invoked as the pipeline runs
///
/// `on_outcome` is called from concurrent delete tasks.
pub trait PurgeObserver: Send + Sync {
    fn on_enumerated(&self, _batch: &EventBatch) {}

    fn on_outcome(&self, event: &EventRef, outcome: &PurgeOutcome);
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl PurgeObserver for SilentObserver {
    fn on_outcome(&self, _event: &EventRef, _outcome: &PurgeOutcome) {}
}
