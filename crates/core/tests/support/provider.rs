use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use calpurge_core::{CalendarProviderClient, PurgeObserver, TokenProvider};
use calpurge_domain::{
    CalPurgeError, DeleteResponse, EventPage, EventRef, PurgeOutcome, Result, TimeWindow,
};
use parking_lot::Mutex;

/// In-memory calendar
///
/// Serves its events in pages of `page_size`, with the page index as the
/// cursor. Deletes answer 204 once per id and 404 afterwards, unless a status
/// was scripted for that id. Tracks how many deletes are in flight.
pub struct InMemoryCalendar {
    events: Vec<EventRef>,
    page_size: usize,
    endless: bool,
    failing_page: Option<(usize, u16)>,
    scripted: HashMap<String, u16>,
    deleted: Mutex<HashSet<String>>,
    delete_latency: Duration,
    windows: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl InMemoryCalendar {
    pub fn with_events(count: usize) -> Self {
        Self {
            events: (0..count).map(|i| EventRef::new(format!("evt-{i}"))).collect(),
            page_size: 500,
            endless: false,
            failing_page: None,
            scripted: HashMap::new(),
            deleted: Mutex::new(HashSet::new()),
            delete_latency: Duration::from_millis(1),
            windows: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Every page advertises a further cursor
    pub fn endless(mut self) -> Self {
        self.endless = true;
        self
    }

    pub fn fail_page(mut self, index: usize, status: u16) -> Self {
        self.failing_page = Some((index, status));
        self
    }

    pub fn respond(mut self, id: &str, status: u16) -> Self {
        self.scripted.insert(id.to_string(), status);
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requested_windows(&self) -> Vec<(String, String)> {
        self.windows.lock().clone()
    }
}

#[async_trait]
impl CalendarProviderClient for InMemoryCalendar {
    async fn list_events(&self, window: &TimeWindow, cursor: Option<&str>) -> Result<EventPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().push((window.start_iso(), window.end_iso()));

        let index: usize = cursor.and_then(|c| c.parse().ok()).unwrap_or(0);
        if let Some((failing, status)) = self.failing_page {
            if failing == index {
                return Err(CalPurgeError::Enumeration { status, body: "listing failed".into() });
            }
        }

        let start = (index * self.page_size).min(self.events.len());
        let end = (start + self.page_size).min(self.events.len());
        let more = self.endless || end < self.events.len();
        let events = if self.endless && start == end {
            (0..self.page_size).map(|i| EventRef::new(format!("extra-{index}-{i}"))).collect()
        } else {
            self.events[start..end].to_vec()
        };

        Ok(EventPage::new(events, more.then(|| (index + 1).to_string())))
    }

    async fn delete_event(&self, event_id: &str) -> Result<DeleteResponse> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.delete_latency).await;

        let response = match self.scripted.get(event_id) {
            Some(0) => Err(CalPurgeError::Network("connection reset by peer".into())),
            Some(&status) => Ok(DeleteResponse::new(status, "scripted")),
            None if self.deleted.lock().insert(event_id.to_string()) => {
                Ok(DeleteResponse::no_content())
            }
            None => Ok(DeleteResponse::new(404, r#"{"error":{"code":"ErrorItemNotFound"}}"#)),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response
    }

    fn provider_name(&self) -> &str {
        "in-memory"
    }
}

/// Token provider returning a fixed token, or a fixed error
pub struct StaticTokens(pub Result<String>);

#[async_trait]
impl TokenProvider for StaticTokens {
    async fn access_token(&self) -> Result<String> {
        self.0.clone()
    }
}

/// Observer that records every callback
#[derive(Default)]
pub struct RecordingObserver {
    pub enumerated: Mutex<Option<usize>>,
    pub outcomes: Mutex<Vec<(String, PurgeOutcome)>>,
}

impl PurgeObserver for RecordingObserver {
    fn on_enumerated(&self, batch: &calpurge_domain::EventBatch) {
        *self.enumerated.lock() = Some(batch.len());
    }

    fn on_outcome(&self, event: &EventRef, outcome: &PurgeOutcome) {
        self.outcomes.lock().push((event.id.clone(), outcome.clone()));
    }
}
