//! # calpurge Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for calendar providers, credentials and
//!   progress output
//! - The purge pipeline: enumeration, bounded deletion, reporting
//!
//! ## Architecture Principles
//! - Only depends on `calpurge-common` and `calpurge-domain`
//! - No HTTP, file system or terminal code
//! - All external dependencies via traits

pub mod purge;

pub use purge::{
    BoundedPurgeExecutor, CalendarProviderClient, EventEnumerator, PurgeMode, PurgeObserver,
    PurgeReport, PurgeRun, PurgeService, PurgeSummary, SilentObserver, TokenProvider,
};
