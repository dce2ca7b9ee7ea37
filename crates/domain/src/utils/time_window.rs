//! Time window resolution
//!
//! Turns user-supplied local wall-clock strings (`YYYY-MM-DD HH:MM`) and an
//! IANA timezone name into a [`TimeWindow`] in UTC.
//!
//! Local times that are ambiguous or skipped around DST transitions are
//! resolved with "not DST" semantics:
//! - ambiguous (fall back): the standard-time reading wins;
//! - nonexistent (spring forward): the offset in force before the gap is used.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::constants::LOCAL_DATETIME_FORMAT;
use crate::errors::{CalPurgeError, Result};
use crate::types::TimeWindow;

/// Resolves local date-time strings against a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowResolver {
    timezone: Tz,
}

impl TimeWindowResolver {
    /// Fails with `InvalidTimezone` when `timezone` is not an IANA name.
    pub fn new(timezone: &str) -> Result<Self> {
        Ok(Self { timezone: parse_timezone(timezone)? })
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Build the UTC window for `start`..`end`.
    pub fn resolve(&self, start: &str, end: &str) -> Result<TimeWindow> {
        let start = self.to_utc(start)?;
        let end = self.to_utc(end)?;
        TimeWindow::new(start, end)
    }

    /// Parse one local wall-clock string and convert it to UTC.
    pub fn to_utc(&self, value: &str) -> Result<DateTime<Utc>> {
        let naive = parse_local(value)?;
        Ok(localize(self.timezone, naive))
    }
}

/// Convenience wrapper around [`TimeWindowResolver`].
pub fn resolve_time_window(start: &str, end: &str, timezone: &str) -> Result<TimeWindow> {
    TimeWindowResolver::new(timezone)?.resolve(start, end)
}

/// IANA names match regardless of case, so `europe/helsinki` is accepted.
pub fn parse_timezone(name: &str) -> Result<Tz> {
    Tz::from_str_insensitive(name).map_err(|_| CalPurgeError::InvalidTimezone(name.to_string()))
}

pub fn parse_local(value: &str) -> Result<NaiveDateTime> {
    // chrono tolerates a sign or leading whitespace before the year
    if !has_local_shape(value) {
        return Err(CalPurgeError::InvalidDateFormat(format!(
            "'{value}' does not match YYYY-MM-DD HH:MM"
        )));
    }
    NaiveDateTime::parse_from_str(value, LOCAL_DATETIME_FORMAT).map_err(|err| {
        CalPurgeError::InvalidDateFormat(format!(
            "'{value}' does not match YYYY-MM-DD HH:MM ({err})"
        ))
    })
}

fn has_local_shape(value: &str) -> bool {
    const SHAPE: &[u8; 16] = b"0000-00-00 00:00";
    value.len() == SHAPE.len()
        && value.bytes().zip(SHAPE.iter()).all(|(b, &s)| match s {
            b'0' => b.is_ascii_digit(),
            sep => b == sep,
        })
}

fn localize(timezone: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(local) => local.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, later) => {
            let standard =
                if earlier.offset().dst_offset() == Duration::zero() { earlier } else { later };
            standard.with_timezone(&Utc)
        }
        LocalResult::None => {
            let before_gap = timezone.offset_from_utc_datetime(&(naive - Duration::hours(24)));
            let offset_secs = i64::from(before_gap.fix().local_minus_utc());
            Utc.from_utc_datetime(&(naive - Duration::seconds(offset_secs)))
        }
    }
}
