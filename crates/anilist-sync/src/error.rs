//! Error types for a sync run.

use crate::partition::Partition;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Retry budget exhausted for one page request; aborts the run
    #[error("{partition} page {page}: giving up after {attempts} attempts: {last_error}")]
    Fatal {
        partition: Partition,
        page: u32,
        attempts: u32,
        last_error: String,
    },

    #[error("Failed to serialize snapshot")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write snapshot to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    pub fn is_fatal_fetch(&self) -> bool {
        matches!(self, SyncError::Fatal { .. })
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
