//! Snapshot path layout under the static API root.

use std::path::{Path, PathBuf};

/// Path manager for the emitted snapshot documents
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    root: PathBuf,
}

impl SnapshotPaths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Current-season listing
    pub fn season_snapshot(&self) -> PathBuf {
        self.root.join("season").join("season.json")
    }

    /// Full multi-year catalog
    pub fn database_snapshot(&self) -> PathBuf {
        self.root.join("database").join("database.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let paths = SnapshotPaths::new("/site/docs/api/v1");

        assert_eq!(
            paths.season_snapshot(),
            PathBuf::from("/site/docs/api/v1/season/season.json")
        );
        assert_eq!(
            paths.database_snapshot(),
            PathBuf::from("/site/docs/api/v1/database/database.json")
        );
    }
}
