//! Calendar provider adapters
//!
//! Implementations of the core `CalendarProviderClient` port for Microsoft
//! Graph and Google Calendar. Both attach a fresh bearer token to every call.

pub mod google;
pub mod microsoft;

use std::sync::Arc;

use calpurge_core::TokenProvider;
use calpurge_domain::{CalPurgeError, DeleteResponse, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::http::HttpClient;

pub use google::{CalendarSelection, GoogleCalendarProvider, GOOGLE_CALENDAR_API_BASE};
pub use microsoft::{MicrosoftCalendarProvider, MICROSOFT_GRAPH_API_BASE};

/// HTTP client plus the credential source, shared by both adapters
#[derive(Clone)]
struct AuthorizedHttp {
    http: HttpClient,
    tokens: Arc<dyn TokenProvider>,
}

impl AuthorizedHttp {
    fn new(http: HttpClient, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { http, tokens }
    }

    async fn send<F>(&self, method: Method, url: &str, configure: F) -> Result<Response>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let token = self.tokens.access_token().await?;
        let builder = self.http.request(method, url).bearer_auth(token);
        self.http.send(configure(builder)).await
    }
}

/// Decode a listing page; any non-success status aborts enumeration
async fn read_page<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        CalPurgeError::Network(format!("failed to read listing response: {e}"))
    })?;

    if !status.is_success() {
        return Err(CalPurgeError::Enumeration { status: status.as_u16(), body });
    }

    serde_json::from_str(&body).map_err(|e| CalPurgeError::Enumeration {
        status: status.as_u16(),
        body: format!("unexpected listing payload: {e}"),
    })
}

/// Status and body of a delete, whatever the status
async fn read_delete(response: Response) -> Result<DeleteResponse> {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| CalPurgeError::Network(format!("failed to read delete response: {e}")))?;
    Ok(DeleteResponse::new(status, body))
}
