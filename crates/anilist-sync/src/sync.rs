//! Sync run orchestration.
//!
//! Partitions are processed strictly in plan order, pages strictly in
//! ascending order, and everything is sequential so the request rate stays
//! under the upstream limit. A fatal fetch error aborts before anything is
//! written.

use crate::api::{query, PageFetcher};
use crate::error::Result;
use crate::merge::DedupMerger;
use crate::pagination::PaginationDriver;
use crate::partition::PartitionPlan;
use crate::projection::{project, Profile};
use crate::retry::{RetryPolicy, RetryScheduler};
use crate::snapshot::SnapshotWriter;
use crate::throttle::{Pacing, Sleeper};
use shared::{Config, SnapshotSource};
use std::path::PathBuf;
use tracing::info;

/// Tunables for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSettings {
    /// Page size requested from upstream
    pub per_page: u32,
    /// Request throttle and partition pause
    pub pacing: Pacing,
    /// Backoff and retry limits
    pub retry: RetryPolicy,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            per_page: config.pacing.per_page,
            pacing: Pacing::from_config(&config.pacing),
            retry: RetryPolicy::from_config(&config.pacing),
        }
    }
}

/// Statistics for a completed run
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Partitions fully collected
    pub partitions: usize,
    /// Successful page fetches
    pub pages: u32,
    /// Records observed before deduplication
    pub records_seen: usize,
    /// Items in the written snapshot
    pub unique_items: usize,
    /// Retries taken across all pages
    pub retries: u32,
    /// Snapshot path
    pub output: PathBuf,
}

/// Drives one run: every partition, merge, then a single snapshot write
pub struct SyncRunner<F, S> {
    /// Upstream page source
    fetcher: F,
    /// Retry and throttle wrapper around every fetch
    scheduler: RetryScheduler<S>,
    /// Partitions to collect, in order
    plan: PartitionPlan,
    /// Record shape for the emitted snapshot
    profile: Profile,
    /// Page size and pacing for this run
    settings: SyncSettings,
}

impl<F: PageFetcher, S: Sleeper> SyncRunner<F, S> {
    pub fn new(
        fetcher: F,
        sleeper: S,
        plan: PartitionPlan,
        profile: Profile,
        settings: SyncSettings,
    ) -> Self {
        Self {
            fetcher,
            scheduler: RetryScheduler::new(settings.retry, settings.pacing.request_delay, sleeper),
            plan,
            profile,
            settings,
        }
    }

    /// Provenance block for this run's snapshot
    pub fn source(&self) -> SnapshotSource {
        let mut source = SnapshotSource {
            name: "AniList GraphQL".to_string(),
            provider: "AniList".to_string(),
            endpoint: self.fetcher.endpoint().to_string(),
            sort: query::SORT.to_string(),
            per_page: self.settings.per_page,
            season: None,
            year: None,
            range: None,
            note: None,
        };

        match self.plan {
            PartitionPlan::Single(partition) => {
                source.season = Some(partition.season);
                source.year = Some(partition.year);
            }
            PartitionPlan::Range(range) => {
                source.range = Some(range);
            }
        }

        if self.profile == Profile::Database {
            source.note = Some("Database list (no description) for app browsing".to_string());
        }

        source
    }

    /// Fetch every partition, merge, and write the snapshot
    pub async fn run(&mut self, writer: &SnapshotWriter) -> Result<SyncReport> {
        let partitions = self.plan.partitions();
        let mut merger = DedupMerger::new();
        let mut report = SyncReport {
            partitions: partitions.len(),
            output: writer.path().to_path_buf(),
            ..Default::default()
        };

        info!(
            profile = self.profile.as_str(),
            partitions = partitions.len(),
            per_page = self.settings.per_page,
            "Starting sync"
        );

        for (idx, partition) in partitions.iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, partitions.len()),
                partition = %partition,
                "Fetching partition"
            );

            let harvest = PaginationDriver::new(
                &mut self.fetcher,
                &mut self.scheduler,
                self.settings.per_page,
            )
            .collect(*partition)
            .await?;

            report.pages += harvest.pages;
            merger.absorb(harvest.records.iter().map(|m| project(self.profile, m)));

            info!(
                partition = %partition,
                pages = harvest.pages,
                records = harvest.records.len(),
                unique_so_far = merger.len(),
                "Partition complete"
            );

            if self.plan.spaces_partitions() && idx + 1 < partitions.len() {
                self.scheduler.pause(self.settings.pacing.partition_delay).await;
            }
        }

        report.records_seen = merger.observed();
        report.unique_items = merger.len();
        report.retries = self.scheduler.retries();

        let snapshot = writer.build(self.source(), merger.into_records());
        writer.write(&snapshot)?;

        info!(
            partitions = report.partitions,
            pages = report.pages,
            records_seen = report.records_seen,
            unique_items = report.unique_items,
            retries = report.retries,
            "Sync complete"
        );

        Ok(report)
    }

    pub fn sleeper(&self) -> &S {
        self.scheduler.sleeper()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchOutcome, Page};
    use crate::partition::Partition;
    use crate::testing::{media, page_of, RecordingSleeper, ScriptedFetcher};
    use shared::{Season, Snapshot, YearRange};
    use std::time::Duration;
    use tempfile::TempDir;

    fn settings() -> SyncSettings {
        SyncSettings {
            per_page: 50,
            pacing: Pacing {
                request_delay: Duration::from_millis(1200),
                partition_delay: Duration::from_millis(1500),
            },
            retry: RetryPolicy {
                max_retries: 2,
                backoff_base: Duration::from_millis(1000),
                backoff_max: Duration::from_millis(8000),
            },
        }
    }

    #[tokio::test]
    async fn test_range_run_applies_all_three_delays() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let writer = SnapshotWriter::new(temp_dir.path().join("database.json"));

        let mut script = vec![FetchOutcome::transient("AniList HTTP 500: flaky")];
        script.extend((0..4).map(|i| FetchOutcome::Page(page_of(&[i], false))));

        let mut runner = SyncRunner::new(
            ScriptedFetcher::new(script),
            RecordingSleeper::default(),
            PartitionPlan::Range(YearRange {
                start_year: 2024,
                end_year: 2024,
            }),
            Profile::Database,
            settings(),
        );

        let report = runner.run(&writer).await?;

        assert_eq!(report.partitions, 4);
        assert_eq!(report.pages, 4);
        assert_eq!(report.unique_items, 4);
        assert_eq!(report.retries, 1);

        let ms = |v: u64| Duration::from_millis(v);
        assert_eq!(
            runner.sleeper().delays,
            vec![
                ms(1000), // backoff
                ms(1200), // throttle, WINTER
                ms(1500), // partition pause
                ms(1200),
                ms(1500),
                ms(1200),
                ms(1500),
                ms(1200), // FALL, no trailing pause
            ]
        );

        let seasons: Vec<Season> = runner.fetcher().requests.iter().map(|(p, _)| p.season).collect();
        assert_eq!(
            seasons,
            vec![Season::Winter, Season::Winter, Season::Spring, Season::Summer, Season::Fall]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_merge_precedence_across_partitions() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("db").join("database.json");
        let writer = SnapshotWriter::new(&path);

        let script = vec![
            FetchOutcome::Page(Page {
                records: vec![media(99, "RELEASING"), media(1, "FINISHED")],
                has_next_page: false,
            }),
            FetchOutcome::Page(Page {
                records: vec![media(99, "FINISHED")],
                has_next_page: false,
            }),
            FetchOutcome::Page(Page::default()),
            FetchOutcome::Page(Page::default()),
        ];

        let mut runner = SyncRunner::new(
            ScriptedFetcher::new(script),
            RecordingSleeper::default(),
            PartitionPlan::Range(YearRange {
                start_year: 2024,
                end_year: 2024,
            }),
            Profile::Database,
            settings(),
        );
        let report = runner.run(&writer).await?;

        assert_eq!(report.records_seen, 3);
        assert_eq!(report.unique_items, 2);

        let snapshot: Snapshot = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let entry = snapshot.items.iter().find(|r| r.id == "99").unwrap();
        assert_eq!(entry.meta.status.as_deref(), Some("FINISHED"));
        assert_eq!(
            snapshot.source.range,
            Some(YearRange {
                start_year: 2024,
                end_year: 2024
            })
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_fatal_writes_nothing() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("season.json");
        let writer = SnapshotWriter::new(&path);

        let mut runner = SyncRunner::new(
            ScriptedFetcher::new(vec![FetchOutcome::Page(page_of(&[1], true))]),
            RecordingSleeper::default(),
            PartitionPlan::Single(Partition::new(2026, Season::Winter)),
            Profile::Season,
            settings(),
        );

        let err = runner.run(&writer).await.unwrap_err();
        assert!(err.is_fatal_fetch());
        assert!(!path.exists());

        Ok(())
    }

    #[test]
    fn test_source_for_single_season() {
        let runner = SyncRunner::new(
            ScriptedFetcher::new(Vec::new()),
            RecordingSleeper::default(),
            PartitionPlan::Single(Partition::new(2026, Season::Winter)),
            Profile::Season,
            settings(),
        );
        let source = runner.source();
        assert_eq!(source.season, Some(Season::Winter));
        assert_eq!(source.year, Some(2026));
        assert_eq!(source.range, None);
        assert_eq!(source.note, None);
        assert_eq!(source.endpoint, "scripted://anilist");
    }
}
