//! Microsoft Graph calendar provider

use std::sync::Arc;

use async_trait::async_trait;
use calpurge_core::{CalendarProviderClient, TokenProvider};
use calpurge_domain::{DeleteResponse, EventPage, EventRef, Result, TimeWindow};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{read_delete, read_page, AuthorizedHttp};
use crate::http::HttpClient;

pub const MICROSOFT_GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
const PAGE_SIZE: u32 = 500;

/// Microsoft Graph provider over the signed-in user's default calendar
#[derive(Clone)]
pub struct MicrosoftCalendarProvider {
    http: AuthorizedHttp,
    base_url: String,
}

impl MicrosoftCalendarProvider {
    pub fn new(http: HttpClient, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_base_url(http, tokens, MICROSOFT_GRAPH_API_BASE)
    }

    pub fn with_base_url(
        http: HttpClient,
        tokens: Arc<dyn TokenProvider>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: AuthorizedHttp::new(http, tokens),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn calendar_view_url(&self, window: &TimeWindow) -> String {
        format!(
            "{}/me/calendarview?startDateTime={}&endDateTime={}&$top={PAGE_SIZE}",
            self.base_url,
            window.start_iso(),
            window.end_iso()
        )
    }
}

#[async_trait]
impl CalendarProviderClient for MicrosoftCalendarProvider {
    /// The cursor is the absolute `@odata.nextLink`, fetched as is
    #[instrument(skip_all, fields(continued = cursor.is_some()))]
    async fn list_events(&self, window: &TimeWindow, cursor: Option<&str>) -> Result<EventPage> {
        let url = cursor.map_or_else(|| self.calendar_view_url(window), str::to_string);
        debug!(%url, "Fetching calendar view page");

        let response = self.http.send(Method::GET, &url, |req| req).await?;
        let page: CalendarViewPage = read_page(response).await?;

        let events = page.value.into_iter().map(GraphEvent::into_event_ref).collect();
        Ok(EventPage::new(events, page.next_link))
    }

    async fn delete_event(&self, event_id: &str) -> Result<DeleteResponse> {
        let url = format!("{}/me/events/{}", self.base_url, urlencoding::encode(event_id));
        let response = self.http.send(Method::DELETE, &url, |req| req).await?;
        read_delete(response).await
    }

    fn provider_name(&self) -> &str {
        "microsoft"
    }
}

#[derive(Debug, Deserialize)]
struct CalendarViewPage {
    #[serde(default)]
    value: Vec<GraphEvent>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphEvent {
    id: String,
    subject: Option<String>,
    start: Option<GraphDateTime>,
}

#[derive(Debug, Deserialize)]
struct GraphDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
}

impl GraphEvent {
    fn into_event_ref(self) -> EventRef {
        EventRef::new(self.id)
            .with_subject(self.subject.filter(|s| !s.trim().is_empty()))
            .with_start(self.start.map(|s| s.date_time))
    }
}
