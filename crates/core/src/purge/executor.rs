//! Bounded-concurrency deletion

use std::convert::Infallible;
use std::sync::Arc;

use calpurge_common::resilience::{Bulkhead, FixedDelay, Throttle};
use calpurge_domain::{EventBatch, EventRef, PurgeConfig, PurgeOutcome};
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use super::ports::{CalendarProviderClient, PurgeObserver};
use super::report::PurgeReport;

/// Deletes every event of a batch with a fixed cap on requests in flight
///
/// Each delete holds a bulkhead slot from before the request is sent until
/// its outcome is recorded and the throttle pause has elapsed. One attempt per
/// event; a failure never stops the others.
pub struct BoundedPurgeExecutor {
    bulkhead: Bulkhead,
    throttle: Arc<dyn Throttle>,
}

impl BoundedPurgeExecutor {
    pub fn new(max_concurrent: usize, throttle: Arc<dyn Throttle>) -> Self {
        Self { bulkhead: Bulkhead::with_limit(max_concurrent), throttle }
    }

    pub fn from_config(config: &PurgeConfig) -> Self {
        Self::new(config.max_concurrent_deletes, Arc::new(FixedDelay::new(config.delete_delay())))
    }

    pub fn max_concurrent(&self) -> usize {
        self.bulkhead.max_concurrent()
    }

    /// Highest number of deletes observed in flight so far
    pub fn peak_concurrent(&self) -> usize {
        self.bulkhead.peak_concurrent()
    }

    #[instrument(skip_all, fields(provider = client.provider_name(), events = batch.len()))]
    pub async fn execute(
        &self,
        client: Arc<dyn CalendarProviderClient>,
        batch: &EventBatch,
        observer: Arc<dyn PurgeObserver>,
    ) -> PurgeReport {
        let report = Arc::new(PurgeReport::new());
        let mut tasks = JoinSet::new();

        for event in batch.iter().cloned() {
            let bulkhead = self.bulkhead.clone();
            let throttle = Arc::clone(&self.throttle);
            let client = Arc::clone(&client);
            let observer = Arc::clone(&observer);
            let report = Arc::clone(&report);

            tasks.spawn(async move {
                let admitted = bulkhead
                    .execute(|| async {
                        let outcome = delete_one(client.as_ref(), &event).await;
                        observer.on_outcome(&event, &outcome);
                        report.record(&event, &outcome);
                        throttle.pause().await;
                        Ok::<_, Infallible>(())
                    })
                    .await;

                // Only a closed gate ends up here; the event still gets an outcome
                if let Err(err) = admitted {
                    error!(event_id = %event.id, error = %err, "Delete gate closed");
                    let outcome = PurgeOutcome::transport_failure(err.to_string());
                    observer.on_outcome(&event, &outcome);
                    report.record(&event, &outcome);
                }
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(err) = joined {
                error!(error = %err, "Delete task panicked");
            }
        }

        let report = Arc::try_unwrap(report).unwrap_or_else(|shared| (*shared).clone());
        info!(
            deleted = report.deleted_count(),
            failed = report.failed_count(),
            peak_concurrent = self.bulkhead.peak_concurrent(),
            "Purge complete"
        );
        report
    }
}

async fn delete_one(client: &dyn CalendarProviderClient, event: &EventRef) -> PurgeOutcome {
    match client.delete_event(&event.id).await {
        Ok(response) => {
            debug!(event_id = %event.id, status = response.status, "Delete answered");
            PurgeOutcome::from_response(response)
        }
        Err(err) => {
            debug!(event_id = %event.id, error = %err, "Delete request failed");
            PurgeOutcome::transport_failure(err.to_string())
        }
    }
}
