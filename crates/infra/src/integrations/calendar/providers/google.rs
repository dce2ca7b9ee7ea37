//! Google Calendar provider

use std::sync::Arc;

use async_trait::async_trait;
use calpurge_core::{CalendarProviderClient, TokenProvider};
use calpurge_domain::constants::PRIMARY_CALENDAR_ID;
use calpurge_domain::{DeleteResponse, EventPage, EventRef, Result, TimeWindow};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{read_delete, read_page, AuthorizedHttp};
use crate::http::HttpClient;

pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: &str = "2500";

/// Outcome of resolving `--calendar NAME`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarSelection {
    /// A calendar whose summary matched, or `primary` when asked for it
    Found(String),
    /// No summary matched; the primary calendar is used instead
    FellBack { requested: String },
}

impl CalendarSelection {
    pub fn calendar_id(&self) -> &str {
        match self {
            Self::Found(id) => id,
            Self::FellBack { .. } => PRIMARY_CALENDAR_ID,
        }
    }
}

/// Google Calendar provider over one calendar
#[derive(Clone)]
pub struct GoogleCalendarProvider {
    http: AuthorizedHttp,
    base_url: String,
    calendar_id: String,
}

impl GoogleCalendarProvider {
    pub fn new(http: HttpClient, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_url(http, tokens, GOOGLE_CALENDAR_API_BASE)
    }

    pub fn with_base_url(
        http: HttpClient,
        tokens: Arc<dyn TokenProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: AuthorizedHttp::new(http, tokens),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            calendar_id: PRIMARY_CALENDAR_ID.to_string(),
        }
    }

    /// Target a specific calendar id
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    /// Find the calendar whose summary equals `name`
    ///
    /// `primary` is taken as is. Otherwise every page of the user's calendar
    /// list is searched.
    ///
    /// # Errors
    /// `CalPurgeError::Enumeration` when the calendar list cannot be read
    #[instrument(skip(self))]
    pub async fn resolve_calendar(&self, name: &str) -> Result<CalendarSelection> {
        if name == PRIMARY_CALENDAR_ID {
            return Ok(CalendarSelection::Found(PRIMARY_CALENDAR_ID.to_string()));
        }

        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut page_token: Option<String> = None;

        loop {
            let token = page_token.clone();
            let response = self
                .http
                .send(Method::GET, &url, |req| match token {
                    Some(t) => req.query(&[("pageToken", t)]),
                    None => req,
                })
                .await?;
            let page: CalendarListPage = read_page(response).await?;

            if let Some(entry) = page.items.into_iter().find(|c| c.summary.as_deref() == Some(name))
            {
                debug!(calendar_id = %entry.id, "Calendar resolved");
                return Ok(CalendarSelection::Found(entry.id));
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        warn!(calendar = name, "Calendar not found, using primary");
        Ok(CalendarSelection::FellBack { requested: name.to_string() })
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, urlencoding::encode(&self.calendar_id))
    }
}

#[async_trait]
impl CalendarProviderClient for GoogleCalendarProvider {
    #[instrument(skip_all, fields(calendar = %self.calendar_id, continued = cursor.is_some()))]
    async fn list_events(&self, window: &TimeWindow, cursor: Option<&str>) -> Result<EventPage> {
        let mut query = vec![
            ("timeMin", window.start_iso()),
            ("timeMax", window.end_iso()),
            ("maxResults", PAGE_SIZE.to_string()),
            ("singleEvents", "true".to_string()),
            ("orderBy", "startTime".to_string()),
        ];
        if let Some(token) = cursor {
            query.push(("pageToken", token.to_string()));
        }

        let response = self.http.send(Method::GET, &self.events_url(), |req| req.query(&query)).await?;
        let page: EventsPage = read_page(response).await?;

        let events = page.items.into_iter().map(GoogleEvent::into_event_ref).collect();
        Ok(EventPage::new(events, page.next_page_token))
    }

    async fn delete_event(&self, event_id: &str) -> Result<DeleteResponse> {
        let url = format!("{}/{}", self.events_url(), urlencoding::encode(event_id));
        let response = self.http.send(Method::DELETE, &url, |req| req).await?;
        read_delete(response).await
    }

    fn provider_name(&self) -> &str {
        "google"
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListPage {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CalendarListEntry {
    id: String,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<GoogleEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleEvent {
    id: String,
    summary: Option<String>,
    start: Option<GoogleEventTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventTime {
    date_time: Option<String>,
    date: Option<String>,
}

impl GoogleEvent {
    fn into_event_ref(self) -> EventRef {
        EventRef::new(self.id)
            .with_subject(self.summary.filter(|s| !s.trim().is_empty()))
            .with_start(self.start.and_then(|s| s.date_time.or(s.date)))
    }
}
