//! Drives page requests for one partition until upstream reports no more pages.

use crate::api::{Media, PageFetcher};
use crate::error::Result;
use crate::partition::Partition;
use crate::retry::RetryScheduler;
use crate::throttle::Sleeper;
use tracing::debug;

/// All records of one partition, in emission order
#[derive(Debug, Clone, Default)]
pub struct PartitionHarvest {
    pub records: Vec<Media>,
    pub pages: u32,
}

pub struct PaginationDriver<'a, F, S> {
    fetcher: &'a mut F,
    scheduler: &'a mut RetryScheduler<S>,
    per_page: u32,
}

impl<'a, F: PageFetcher, S: Sleeper> PaginationDriver<'a, F, S> {
    pub fn new(fetcher: &'a mut F, scheduler: &'a mut RetryScheduler<S>, per_page: u32) -> Self {
        Self {
            fetcher,
            scheduler,
            per_page,
        }
    }

    /// Fetch pages 1, 2, ... in order. No page cap beyond what upstream reports.
    pub async fn collect(&mut self, partition: Partition) -> Result<PartitionHarvest> {
        let mut harvest = PartitionHarvest::default();
        let mut page = 1;

        loop {
            let result = self
                .scheduler
                .fetch(&mut *self.fetcher, partition, page, self.per_page)
                .await?;

            harvest.pages += 1;
            harvest.records.extend(result.records);

            if !result.has_next_page {
                break;
            }
            page += 1;
        }

        debug!(
            partition = %partition,
            pages = harvest.pages,
            records = harvest.records.len(),
            "Partition pagination complete"
        );

        Ok(harvest)
    }
}
