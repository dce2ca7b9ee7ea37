//! UTC query interval

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CalPurgeError, Result};

/// Inclusive-start interval in UTC. `start <= end` holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Unchecked wire form; deserialization goes through [`TimeWindow::new`].
#[derive(Deserialize)]
struct WindowBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<WindowBounds> for TimeWindow {
    type Error = CalPurgeError;

    fn try_from(bounds: WindowBounds) -> Result<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(CalPurgeError::InvalidInput(format!(
                "start {} is after end {}",
                format_utc(start),
                format_utc(end)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Lower bound as sent to providers, e.g. `2023-01-01T00:00:00Z`.
    pub fn start_iso(&self) -> String {
        format_utc(self.start)
    }

    /// Upper bound as sent to providers.
    pub fn end_iso(&self) -> String {
        format_utc(self.end)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.start_iso(), self.end_iso())
    }
}

/// ISO-8601 with a literal `Z` suffix. Providers reject the `+00:00` form.
pub fn format_utc(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn serializes_bounds_with_z_suffix() {
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, end).unwrap();

        assert_eq!(window.start_iso(), "2023-01-01T00:00:00Z");
        assert_eq!(window.end_iso(), "2023-01-02T00:00:00Z");
        assert!(!window.to_string().contains("+00:00"));
    }

    #[test]
    fn empty_window_is_allowed() {
        let at = Utc.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        assert!(TimeWindow::new(at, at).is_ok());
    }

    #[test]
    fn reversed_window_is_rejected() {
        let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(TimeWindow::new(start, end), Err(CalPurgeError::InvalidInput(_))));
    }

    #[test]
    fn deserializing_checks_the_bounds() {
        let window: TimeWindow = serde_json::from_str(
            r#"{"start":"2023-01-01T00:00:00Z","end":"2023-01-02T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(window.end_iso(), "2023-01-02T00:00:00Z");

        let reversed = serde_json::from_str::<TimeWindow>(
            r#"{"start":"2023-01-02T00:00:00Z","end":"2023-01-01T00:00:00Z"}"#,
        )
        .unwrap_err();
        assert!(reversed.to_string().contains("is after end"), "{reversed}");
    }
}
