//! Trait abstractions for state storage operations.
//!
//! This module defines the `StateStore` trait which abstracts state persistence,
//! enabling dependency injection and testability.

use crate::Result;
use crate::config::Config;
use crate::state::RunRecord;

/// Trait for state storage operations.
///
/// This trait abstracts state persistence, allowing for:
/// - Dependency injection in services
/// - In-memory implementations for testing
#[allow(clippy::missing_errors_doc)]
pub trait StateStore {
    /// Load the config, falling back to defaults.
    fn load_config(&self) -> Result<Config>;

    /// Save a run record, replacing the previous one.
    fn save_run(&self, record: &RunRecord) -> Result<()>;

    /// Load the most recent run record.
    fn load_last_run(&self) -> Result<RunRecord>;
}

impl StateStore for crate::state::State {
    fn load_config(&self) -> Result<Config> {
        self.load_config()
    }

    fn save_run(&self, record: &RunRecord) -> Result<()> {
        self.save_run(record)
    }

    fn load_last_run(&self) -> Result<RunRecord> {
        self.load_last_run()
    }
}
