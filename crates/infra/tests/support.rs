//! Shared helpers for `calpurge-infra` integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use calpurge_core::TokenProvider;
use calpurge_domain::{resolve_time_window, Result, TimeWindow};
use calpurge_infra::HttpClient;
use serde_json::{json, Value};

/// Token provider that hands out a fixed token and counts calls
#[derive(Default)]
pub struct FixedToken {
    calls: AtomicUsize,
}

impl FixedToken {
    pub const TOKEN: &'static str = "test-access-token";

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FixedToken {
    async fn access_token(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::TOKEN.to_string())
    }
}

/// HTTP client that ignores proxy settings so requests reach the mock server
pub fn test_http() -> HttpClient {
    HttpClient::builder().no_proxy().build().expect("http client")
}

pub fn test_reqwest() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().expect("reqwest client")
}

pub fn utc_day() -> TimeWindow {
    resolve_time_window("2023-01-01 00:00", "2023-01-02 00:00", "UTC").expect("valid window")
}

/// Graph events with ids `{prefix}-0..n`
pub fn graph_events(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("{prefix}-{i}"),
                "subject": format!("Meeting {i}"),
                "start": {"dateTime": "2023-01-01T09:00:00.0000000", "timeZone": "UTC"}
            })
        })
        .collect()
}

/// Google events with ids `{prefix}-0..n`
pub fn google_events(prefix: &str, count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "id": format!("{prefix}{i}"),
                "summary": format!("Event {i}"),
                "start": {"dateTime": "2023-01-01T09:00:00Z"}
            })
        })
        .collect()
}

pub fn token_response(access: &str, refresh: Option<&str>) -> Value {
    let mut body = json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "Calendars.ReadWrite offline_access"
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    body
}
