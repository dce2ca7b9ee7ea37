//! Pure helpers over domain types

pub mod time_window;

pub use time_window::{parse_local, parse_timezone, resolve_time_window, TimeWindowResolver};
