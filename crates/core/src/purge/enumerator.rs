//! Paginated event enumeration

use std::sync::Arc;

use calpurge_common::resilience::{FixedDelay, Throttle};
use calpurge_domain::{EventBatch, PurgeConfig, Result, TimeWindow};
use tracing::{debug, info, instrument, warn};

use super::ports::CalendarProviderClient;

/// Walks listing pages into one capped, ordered batch
///
/// Pages are fetched one at a time with the throttle's pause between
/// consecutive fetches. Any failed page aborts the walk and nothing
/// collected so far is returned.
pub struct EventEnumerator {
    throttle: Arc<dyn Throttle>,
    max_events: usize,
}

impl EventEnumerator {
    pub fn new(throttle: Arc<dyn Throttle>, max_events: usize) -> Self {
        Self { throttle, max_events: max_events.max(1) }
    }

    pub fn from_config(config: &PurgeConfig) -> Self {
        Self::new(Arc::new(FixedDelay::new(config.page_delay())), config.max_events)
    }

    pub fn max_events(&self) -> usize {
        self.max_events
    }

    #[instrument(skip_all, fields(provider = client.provider_name(), window = %window))]
    pub async fn enumerate(
        &self,
        client: &dyn CalendarProviderClient,
        window: &TimeWindow,
    ) -> Result<EventBatch> {
        let mut events = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page = 0usize;

        loop {
            if page > 0 {
                self.throttle.pause().await;
            }

            let fetched = client.list_events(window, cursor.as_deref()).await?;
            page += 1;
            debug!(page, count = fetched.events.len(), "Fetched event page");

            events.extend(fetched.events);
            cursor = fetched.next_cursor;

            if events.len() >= self.max_events || cursor.is_none() {
                break;
            }
        }

        let truncated = events.len() > self.max_events || cursor.is_some();
        if truncated {
            events.truncate(self.max_events);
            warn!(
                cap = self.max_events,
                pages = page,
                "Event cap reached, remaining events in the window were not listed"
            );
        }

        info!(count = events.len(), pages = page, "Enumeration complete");
        Ok(EventBatch::new(events, truncated))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use calpurge_common::resilience::NoDelay;
    use calpurge_domain::{CalPurgeError, DeleteResponse, EventPage, EventRef};
    use chrono::{TimeZone, Utc};

    use super::*;

    /// Serves `pages` in order; page `n` carries cursor `n+1` when more follow.
    struct PagedClient {
        pages: Vec<Result<Vec<&'static str>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CalendarProviderClient for PagedClient {
        async fn list_events(&self, _w: &TimeWindow, cursor: Option<&str>) -> Result<EventPage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let index: usize = cursor.map_or(0, |c| c.parse().unwrap_or(0));
            let ids = self.pages[index].clone()?;
            let next = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
            Ok(EventPage::new(ids.into_iter().map(EventRef::new).collect(), next))
        }

        async fn delete_event(&self, _id: &str) -> Result<DeleteResponse> {
            Ok(DeleteResponse::no_content())
        }

        fn provider_name(&self) -> &str {
            "paged"
        }
    }

    fn window() -> TimeWindow {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        TimeWindow::new(start, end).unwrap()
    }

    fn enumerator(cap: usize) -> EventEnumerator {
        EventEnumerator::new(Arc::new(NoDelay), cap)
    }

    #[tokio::test]
    async fn follows_cursors_in_order() {
        let client = PagedClient {
            pages: vec![Ok(vec!["a", "b"]), Ok(vec!["c"]), Ok(vec!["d", "e"])],
            calls: AtomicUsize::new(0),
        };

        let batch = enumerator(100).enumerate(&client, &window()).await.unwrap();

        let ids: Vec<_> = batch.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d", "e"]);
        assert!(!batch.is_truncated());
        assert_eq!(client.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn stops_at_cap_and_marks_truncated() {
        let client = PagedClient {
            pages: vec![Ok(vec!["a", "b", "c"]), Ok(vec!["d", "e", "f"]), Ok(vec!["g"])],
            calls: AtomicUsize::new(0),
        };

        let batch = enumerator(4).enumerate(&client, &window()).await.unwrap();

        assert_eq!(batch.len(), 4);
        assert!(batch.is_truncated());
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exact_cap_with_no_cursor_is_complete() {
        let client =
            PagedClient { pages: vec![Ok(vec!["a", "b"])], calls: AtomicUsize::new(0) };

        let batch = enumerator(2).enumerate(&client, &window()).await.unwrap();

        assert_eq!(batch.len(), 2);
        assert!(!batch.is_truncated());
    }

    #[tokio::test]
    async fn failed_page_returns_no_partial_result() {
        let client = PagedClient {
            pages: vec![
                Ok(vec!["a"]),
                Err(CalPurgeError::Enumeration { status: 500, body: "boom".into() }),
            ],
            calls: AtomicUsize::new(0),
        };

        let err = enumerator(100).enumerate(&client, &window()).await.unwrap_err();

        assert_eq!(err, CalPurgeError::Enumeration { status: 500, body: "boom".into() });
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_only_between_pages() {
        let client = PagedClient {
            pages: vec![Ok(vec!["a"]), Ok(vec!["b"]), Ok(vec!["c"])],
            calls: AtomicUsize::new(0),
        };
        let enumerator = EventEnumerator::new(Arc::new(FixedDelay::from_millis(50)), 100);
        let started = tokio::time::Instant::now();

        enumerator.enumerate(&client, &window()).await.unwrap();

        assert_eq!(started.elapsed(), std::time::Duration::from_millis(100));
    }
}
