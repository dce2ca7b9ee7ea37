//! Run report

use std::fmt;

use calpurge_domain::{EventRef, PurgeFailure, PurgeOutcome};
use parking_lot::Mutex;
use serde::Serialize;

#[derive(Debug, Default, Clone)]
struct ReportState {
    deleted: usize,
    failures: Vec<PurgeFailure>,
}

/// Thread-safe accumulator of delete outcomes
///
/// Delete tasks append concurrently through [`record`](Self::record); the
/// getters take a consistent snapshot.
#[derive(Debug, Default)]
pub struct PurgeReport {
    state: Mutex<ReportState>,
}

impl PurgeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: &EventRef, outcome: &PurgeOutcome) {
        let mut state = self.state.lock();
        match outcome {
            PurgeOutcome::Deleted => state.deleted += 1,
            PurgeOutcome::Failed { reason, status } => state.failures.push(PurgeFailure {
                event: event.clone(),
                reason: reason.clone(),
                status: *status,
            }),
        }
    }

    pub fn deleted_count(&self) -> usize {
        self.state.lock().deleted
    }

    pub fn failed_count(&self) -> usize {
        self.state.lock().failures.len()
    }

    pub fn total(&self) -> usize {
        let state = self.state.lock();
        state.deleted + state.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.state.lock().failures.is_empty()
    }

    /// Failures in completion order
    pub fn failures(&self) -> Vec<PurgeFailure> {
        self.state.lock().failures.clone()
    }

    pub fn summary(&self) -> PurgeSummary {
        let state = self.state.lock();
        PurgeSummary { deleted: state.deleted, failed: state.failures.len() }
    }
}

impl Clone for PurgeReport {
    fn clone(&self) -> Self {
        Self { state: Mutex::new(self.state.lock().clone()) }
    }
}

/// Final counts, printed as `Deleted: X, Failed: Y`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    pub deleted: usize,
    pub failed: usize,
}

impl fmt::Display for PurgeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Deleted: {}, Failed: {}", self.deleted, self.failed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn counts_outcomes() {
        let report = PurgeReport::new();
        report.record(&EventRef::new("a"), &PurgeOutcome::Deleted);
        report.record(
            &EventRef::new("b"),
            &PurgeOutcome::Failed { reason: "gone".into(), status: Some(404) },
        );
        report.record(&EventRef::new("c"), &PurgeOutcome::transport_failure("reset"));

        assert_eq!(report.deleted_count(), 1);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.total(), 3);
        assert!(report.has_failures());

        let failures = report.failures();
        assert_eq!(failures[0].event.id, "b");
        assert_eq!(failures[0].status, Some(404));
        assert_eq!(failures[1].status, None);
    }

    #[test]
    fn summary_line() {
        let report = PurgeReport::new();
        for id in ["a", "b", "c"] {
            report.record(&EventRef::new(id), &PurgeOutcome::Deleted);
        }
        assert_eq!(report.summary().to_string(), "Deleted: 3, Failed: 0");
        assert!(!report.has_failures());
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        let report = Arc::new(PurgeReport::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let report = Arc::clone(&report);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let outcome = if i % 2 == 0 {
                            PurgeOutcome::Deleted
                        } else {
                            PurgeOutcome::transport_failure("x")
                        };
                        report.record(&EventRef::new(format!("{t}-{i}")), &outcome);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(report.deleted_count(), 400);
        assert_eq!(report.failed_count(), 400);
    }

    #[test]
    fn clone_is_a_snapshot() {
        let report = PurgeReport::new();
        report.record(&EventRef::new("a"), &PurgeOutcome::Deleted);
        let snapshot = report.clone();
        report.record(&EventRef::new("b"), &PurgeOutcome::Deleted);

        assert_eq!(snapshot.deleted_count(), 1);
        assert_eq!(report.deleted_count(), 2);
    }
}
