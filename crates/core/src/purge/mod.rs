//! Event purge pipeline
//!
//! `EventEnumerator` walks the provider's listing into an `EventBatch`,
//! `BoundedPurgeExecutor` deletes it under a concurrency cap and
//! `PurgeReport` collects the outcomes. `PurgeService` runs the three in
//! order after authenticating.

pub mod enumerator;
pub mod executor;
pub mod ports;
pub mod report;
pub mod service;

pub use enumerator::EventEnumerator;
pub use executor::BoundedPurgeExecutor;
pub use ports::{CalendarProviderClient, PurgeObserver, SilentObserver, TokenProvider};
pub use report::{PurgeReport, PurgeSummary};
pub use service::{PurgeMode, PurgeRun, PurgeService};
