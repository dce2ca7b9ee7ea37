//! Full purge against a mock Microsoft Graph
//!
//! Window resolution, paginated listing, bounded deletes and the report,
//! wired the way the binary wires them.

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use std::sync::Arc;

use calpurge_common::resilience::NoDelay;
use calpurge_core::{BoundedPurgeExecutor, EventEnumerator, PurgeMode, PurgeService};
use calpurge_domain::{CalPurgeError, PurgeConfig};
use calpurge_infra::MicrosoftCalendarProvider;
use serde_json::json;
use support::{graph_events, test_http, utc_day, FixedToken};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> PurgeService {
    let tokens = FixedToken::shared();
    let provider = MicrosoftCalendarProvider::with_base_url(
        test_http(),
        tokens.clone(),
        format!("{}/v1.0", server.uri()),
    );

    PurgeService::new(Arc::new(provider), tokens, &PurgeConfig::default())
        .with_enumerator(EventEnumerator::new(Arc::new(NoDelay), 9500))
        .with_executor(BoundedPurgeExecutor::new(3, Arc::new(NoDelay)))
}

#[tokio::test]
async fn three_events_in_one_utc_day_are_deleted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/calendarview"))
        .and(query_param("startDateTime", "2023-01-01T00:00:00Z"))
        .and(query_param("endDateTime", "2023-01-02T00:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": graph_events("evt", 3)
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(r"^/v1\.0/me/events/evt-\d$"))
        .respond_with(ResponseTemplate::new(204))
        .expect(3)
        .mount(&server)
        .await;

    let run = service(&server).run(&utc_day(), PurgeMode::Delete).await.unwrap();
    let report = run.report.unwrap();

    assert_eq!(report.deleted_count(), 3);
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.summary().to_string(), "Deleted: 3, Failed: 0");
}

#[tokio::test]
async fn pages_are_followed_and_failures_recorded() {
    let server = MockServer::start().await;
    let next_link = format!("{}/v1.0/me/calendarview?$skiptoken=page2", server.uri());

    Mock::given(method("GET"))
        .and(path("/v1.0/me/calendarview"))
        .and(query_param("$skiptoken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": graph_events("b", 2)
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/calendarview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": graph_events("a", 2),
            "@odata.nextLink": next_link
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1.0/me/events/b-1"))
        .respond_with(ResponseTemplate::new(403).set_body_string("ErrorAccessDenied"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let run = service(&server).run(&utc_day(), PurgeMode::Delete).await.unwrap();

    let ids: Vec<_> = run.batch.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["a-0", "a-1", "b-0", "b-1"]);

    let report = run.report.unwrap();
    assert_eq!(report.deleted_count(), 3);
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].event.id, "b-1");
    assert_eq!(failures[0].status, Some(403));
    assert_eq!(failures[0].reason, "ErrorAccessDenied");
}

#[tokio::test]
async fn listing_error_aborts_before_deleting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream"))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = service(&server).run(&utc_day(), PurgeMode::Delete).await.unwrap_err();
    assert_eq!(err, CalPurgeError::Enumeration { status: 500, body: "upstream".into() });
}
