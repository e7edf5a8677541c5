//! Partition enumeration.
//!
//! A partition is one season of one year. Iteration order is part of the
//! merge contract: later partitions overwrite earlier ones.

use shared::{Season, YearRange};

/// One upstream query scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition {
    pub year: i32,
    pub season: Season,
}

impl Partition {
    pub fn new(year: i32, season: Season) -> Self {
        Self { year, season }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.year, self.season)
    }
}

/// Which partitions a run covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionPlan {
    /// Current-season listing
    Single(Partition),
    /// Every season of every year in the range, year-major
    Range(YearRange),
}

impl PartitionPlan {
    /// The ordered partition sequence
    pub fn partitions(&self) -> Vec<Partition> {
        match *self {
            PartitionPlan::Single(partition) => vec![partition],
            PartitionPlan::Range(range) => (range.start_year..=range.end_year)
                .flat_map(|year| Season::ALL.into_iter().map(move |season| Partition::new(year, season)))
                .collect(),
        }
    }

    /// Whether to pause between partitions
    pub fn spaces_partitions(&self) -> bool {
        matches!(self, PartitionPlan::Range(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_plan() {
        let plan = PartitionPlan::Single(Partition::new(2026, Season::Winter));
        assert_eq!(plan.partitions(), vec![Partition::new(2026, Season::Winter)]);
        assert!(!plan.spaces_partitions());
    }

    #[test]
    fn test_range_plan_is_year_major() {
        let plan = PartitionPlan::Range(YearRange {
            start_year: 2023,
            end_year: 2024,
        });
        let partitions = plan.partitions();

        assert_eq!(partitions.len(), 8);
        assert_eq!(partitions[0], Partition::new(2023, Season::Winter));
        assert_eq!(partitions[3], Partition::new(2023, Season::Fall));
        assert_eq!(partitions[4], Partition::new(2024, Season::Winter));
        assert_eq!(partitions[7], Partition::new(2024, Season::Fall));

        let mut sorted = partitions.clone();
        sorted.sort();
        assert_eq!(sorted, partitions);
    }

    #[test]
    fn test_single_year_range() {
        let plan = PartitionPlan::Range(YearRange {
            start_year: 2020,
            end_year: 2020,
        });
        let seasons: Vec<Season> = plan.partitions().iter().map(|p| p.season).collect();
        assert_eq!(seasons, Season::ALL.to_vec());
    }

    #[test]
    fn test_display() {
        assert_eq!(Partition::new(2024, Season::Spring).to_string(), "2024-SPRING");
    }
}
