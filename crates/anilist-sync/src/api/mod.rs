//! AniList GraphQL access.
//!
//! The sync engine only sees the [`PageFetcher`] seam: execute the page query
//! for one partition and page number, get back a classified outcome.

pub mod client;
pub mod outcome;
pub mod query;
pub mod types;

pub use client::AniListClient;
pub use outcome::{classify_response, FetchOutcome, Page};
pub use types::*;

use crate::partition::Partition;
use async_trait::async_trait;

/// Issues one page request against the upstream API
#[async_trait]
pub trait PageFetcher: Send {
    async fn fetch_page(&mut self, partition: Partition, page: u32, per_page: u32) -> FetchOutcome;

    /// Endpoint name for snapshot provenance
    fn endpoint(&self) -> &str;
}
