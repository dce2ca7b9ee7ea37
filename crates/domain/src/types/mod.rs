//! Domain types and models

pub mod event;
pub mod outcome;
pub mod window;

pub use event::{EventBatch, EventPage, EventRef};
pub use outcome::{DeleteResponse, PurgeFailure, PurgeOutcome};
pub use window::TimeWindow;
