//! Purge orchestration: authenticate, enumerate, delete

use std::sync::Arc;

use calpurge_domain::{CalPurgeError, ErrorCategory, EventBatch, PurgeConfig, Result, TimeWindow};
use tracing::{info, instrument};

use super::enumerator::EventEnumerator;
use super::executor::BoundedPurgeExecutor;
use super::ports::{CalendarProviderClient, PurgeObserver, SilentObserver, TokenProvider};
use super::report::PurgeReport;

/// Whether the run deletes or only lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurgeMode {
    #[default]
    Delete,
    DryRun,
}

/// Result of a full run
#[derive(Debug)]
pub struct PurgeRun {
    pub batch: EventBatch,
    /// `None` for a dry run
    pub report: Option<PurgeReport>,
}

impl PurgeRun {
    pub fn failed_count(&self) -> usize {
        self.report.as_ref().map_or(0, PurgeReport::failed_count)
    }
}

/// Purge service
pub struct PurgeService {
    client: Arc<dyn CalendarProviderClient>,
    tokens: Arc<dyn TokenProvider>,
    enumerator: EventEnumerator,
    executor: BoundedPurgeExecutor,
    observer: Arc<dyn PurgeObserver>,
}

impl PurgeService {
    pub fn new(
        client: Arc<dyn CalendarProviderClient>,
        tokens: Arc<dyn TokenProvider>,
        config: &PurgeConfig,
    ) -> Self {
        Self {
            client,
            tokens,
            enumerator: EventEnumerator::from_config(config),
            executor: BoundedPurgeExecutor::from_config(config),
            observer: Arc::new(SilentObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PurgeObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_enumerator(mut self, enumerator: EventEnumerator) -> Self {
        self.enumerator = enumerator;
        self
    }

    pub fn with_executor(mut self, executor: BoundedPurgeExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Obtain a credential before touching the calendar
    ///
    /// Configuration problems keep their category; anything else becomes
    /// `CalPurgeError::Auth`.
    pub async fn authenticate(&self) -> Result<()> {
        self.tokens.access_token().await.map(|_| ()).map_err(|err| match err.category() {
            ErrorCategory::Configuration | ErrorCategory::Authentication => err,
            _ => CalPurgeError::Auth(err.to_string()),
        })
    }

    pub async fn enumerate(&self, window: &TimeWindow) -> Result<EventBatch> {
        let batch = self.enumerator.enumerate(self.client.as_ref(), window).await?;
        self.observer.on_enumerated(&batch);
        Ok(batch)
    }

    pub async fn purge(&self, batch: &EventBatch) -> PurgeReport {
        self.executor.execute(Arc::clone(&self.client), batch, Arc::clone(&self.observer)).await
    }

    #[instrument(skip_all, fields(provider = self.client.provider_name(), window = %window, mode = ?mode))]
    pub async fn run(&self, window: &TimeWindow, mode: PurgeMode) -> Result<PurgeRun> {
        self.authenticate().await?;
        let batch = self.enumerate(window).await?;

        if mode == PurgeMode::DryRun {
            info!(count = batch.len(), "Dry run, nothing deleted");
            return Ok(PurgeRun { batch, report: None });
        }

        let report = self.purge(&batch).await;
        Ok(PurgeRun { batch, report: Some(report) })
    }
}
