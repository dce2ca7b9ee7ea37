//! Event identities and enumeration results

use serde::{Deserialize, Serialize};

/// Minimal handle on a provider event.
///
/// Only `id` is needed to delete; `subject` and `start` are carried for
/// display in dry runs and logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

impl EventRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), subject: None, start: None }
    }

    pub fn with_subject(mut self, subject: Option<String>) -> Self {
        self.subject = subject.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_start(mut self, start: Option<String>) -> Self {
        self.start = start;
        self
    }

    /// One-line description: `id`, optionally followed by start and subject.
    pub fn describe(&self) -> String {
        match (&self.start, &self.subject) {
            (Some(start), Some(subject)) => format!("{} [{start}] {subject}", self.id),
            (Some(start), None) => format!("{} [{start}]", self.id),
            (None, Some(subject)) => format!("{} {subject}", self.id),
            (None, None) => self.id.clone(),
        }
    }
}

/// One page of a listing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<EventRef>,
    /// Opaque continuation (next-page link or page token).
    pub next_cursor: Option<String>,
}

impl EventPage {
    pub fn new(events: Vec<EventRef>, next_cursor: Option<String>) -> Self {
        Self { events, next_cursor }
    }

    pub fn last(events: Vec<EventRef>) -> Self {
        Self { events, next_cursor: None }
    }
}

/// Enumeration result in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatch {
    events: Vec<EventRef>,
    truncated: bool,
}

impl EventBatch {
    pub fn new(events: Vec<EventRef>, truncated: bool) -> Self {
        Self { events, truncated }
    }

    pub fn complete(events: Vec<EventRef>) -> Self {
        Self::new(events, false)
    }

    pub fn events(&self) -> &[EventRef] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// True when the enumeration cap discarded events or left pages unread.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRef> {
        self.events.iter()
    }

    pub fn into_events(self) -> Vec<EventRef> {
        self.events
    }
}

impl<'a> IntoIterator for &'a EventBatch {
    type Item = &'a EventRef;
    type IntoIter = std::slice::Iter<'a, EventRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
