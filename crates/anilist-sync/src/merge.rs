//! Identity-keyed merge across partitions.
//!
//! Insert-or-overwrite by id: the last writer wins, where "last" follows
//! partition order and then emission order within a partition.

use indexmap::IndexMap;
use shared::CanonicalRecord;

#[derive(Debug, Default)]
pub struct DedupMerger {
    items: IndexMap<String, CanonicalRecord>,
    observed: usize,
}

impl DedupMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one partition's records in emission order
    pub fn absorb(&mut self, records: impl IntoIterator<Item = CanonicalRecord>) {
        for record in records {
            self.observed += 1;
            self.items.insert(record.id.clone(), record);
        }
    }

    /// Distinct ids seen so far
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records absorbed, counting duplicates
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalRecord> {
        self.items.get(id)
    }

    pub fn into_records(self) -> Vec<CanonicalRecord> {
        self.items.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{project, Profile};
    use crate::testing::media;

    fn record(id: u64, status: &str) -> CanonicalRecord {
        project(Profile::Database, &media(id, status))
    }

    #[test]
    fn test_later_partition_wins() {
        let mut merger = DedupMerger::new();
        merger.absorb(vec![record(99, "RELEASING"), record(1, "FINISHED")]);
        merger.absorb(vec![record(99, "FINISHED")]);

        assert_eq!(merger.len(), 2);
        assert_eq!(merger.observed(), 3);
        assert_eq!(merger.get("99").unwrap().meta.status.as_deref(), Some("FINISHED"));
    }

    #[test]
    fn test_later_emission_within_partition_wins() {
        let mut merger = DedupMerger::new();
        merger.absorb(vec![record(5, "NOT_YET_RELEASED"), record(5, "RELEASING")]);

        assert_eq!(merger.len(), 1);
        assert_eq!(merger.get("5").unwrap().meta.status.as_deref(), Some("RELEASING"));
    }

    #[test]
    fn test_no_duplicates_no_drops() {
        let mut merger = DedupMerger::new();
        merger.absorb((1..=10).map(|id| record(id, "FINISHED")));
        merger.absorb((6..=15).map(|id| record(id, "FINISHED")));

        let mut ids: Vec<u64> = merger
            .into_records()
            .iter()
            .map(|r| r.id.parse().unwrap())
            .collect();
        ids.sort();
        assert_eq!(ids, (1..=15).collect::<Vec<_>>());
    }
}
