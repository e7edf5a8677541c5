//! Shared library for the anime season sync jobs.
//!
//! This crate provides functionality common to both deployments:
//! - Configuration management
//! - Snapshot data model
//! - Output path layout
//! - Logging infrastructure

pub mod config;
pub mod logging;
pub mod models;
pub mod paths;

// Re-export commonly used types
pub use config::Config;
pub use logging::LogConfig;
pub use models::*;
pub use paths::SnapshotPaths;

/// Common result type using anyhow::Error
pub type Result<T> = anyhow::Result<T>;
