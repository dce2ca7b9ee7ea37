//! Per-event deletion results

use serde::{Deserialize, Serialize};

use super::event::EventRef;
use crate::constants::DELETED_STATUS;

/// Raw provider answer to a delete call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: u16,
    pub body: String,
}

impl DeleteResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn no_content() -> Self {
        Self::new(DELETED_STATUS, String::new())
    }

    pub fn is_no_content(&self) -> bool {
        self.status == DELETED_STATUS
    }
}

/// Result of a single delete attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PurgeOutcome {
    Deleted,
    /// `status` is `None` when no HTTP response was received.
    Failed { reason: String, status: Option<u16> },
}

impl PurgeOutcome {
    /// Only "no content" counts as deleted. Every other status, including
    /// other 2xx codes and not-found for already removed events, is a failure.
    pub fn from_response(response: DeleteResponse) -> Self {
        if response.is_no_content() {
            Self::Deleted
        } else {
            Self::Failed { reason: response.body, status: Some(response.status) }
        }
    }

    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self::Failed { reason: reason.into(), status: None }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// A failed deletion kept for the end-of-run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeFailure {
    pub event: EventRef,
    pub reason: String,
    pub status: Option<u16>,
}
