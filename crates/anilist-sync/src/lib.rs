//! Paginated ingestion engine for the anime season snapshots.
//!
//! Queries AniList season by season, merges records by id across
//! partitions, and emits the static JSON documents read by the app.

pub mod api;
pub mod error;
pub mod merge;
pub mod pagination;
pub mod partition;
pub mod projection;
pub mod retry;
pub mod snapshot;
pub mod sync;
pub mod throttle;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{AniListClient, FetchOutcome, Page, PageFetcher};
pub use error::SyncError;
pub use merge::DedupMerger;
pub use pagination::PaginationDriver;
pub use partition::{Partition, PartitionPlan};
pub use projection::Profile;
pub use retry::{RetryDecision, RetryPolicy, RetryScheduler};
pub use snapshot::SnapshotWriter;
pub use sync::{SyncReport, SyncRunner, SyncSettings};
pub use throttle::{Pacing, Sleeper, TokioSleeper};
