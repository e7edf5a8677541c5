//! Snapshot assembly and persistence.
//!
//! The destination is replaced wholesale: the document is written to a
//! sibling temp file and renamed over the target, so a failed run never
//! leaves a truncated snapshot behind.

use crate::error::{Result, SyncError};
use chrono::Utc;
use shared::{CanonicalRecord, Snapshot, SnapshotSource};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Writes snapshot documents to one destination path
pub struct SnapshotWriter {
    /// Destination document, replaced on every successful run
    path: PathBuf,
}

impl SnapshotWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wrap merged records in the envelope, normalizing each one
    pub fn build(&self, source: SnapshotSource, records: Vec<CanonicalRecord>) -> Snapshot {
        Snapshot {
            generated_at: Utc::now(),
            source,
            items: records.into_iter().map(CanonicalRecord::normalized).collect(),
        }
    }

    /// Persist a snapshot, creating the destination directory if needed
    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        let io_err = |source: std::io::Error| SyncError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let mut content = serde_json::to_string_pretty(snapshot)?;
        content.push('\n');

        let tmp_path = self.temp_path();
        std::fs::write(&tmp_path, content)
            .and_then(|()| std::fs::rename(&tmp_path, &self.path))
            .map_err(|e| {
                discard_temp(&tmp_path);
                io_err(e)
            })?;

        info!(
            path = %self.path.display(),
            items = snapshot.items.len(),
            "Snapshot written"
        );

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Best-effort removal of a partial temp file after a failed write
fn discard_temp(path: &Path) {
    if path.is_file() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "Failed to remove temp snapshot");
        }
    }
}
