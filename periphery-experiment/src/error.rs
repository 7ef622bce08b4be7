//! Error kinds surfaced to the session's single teardown path.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExperimentError>;

#[derive(Error, Debug)]
pub enum ExperimentError {
    /// Escape was pressed or the window was closed.
    #[error("experiment aborted by the participant")]
    AbortedByUser,

    #[error("failed to write results to {path}: {source}")]
    PersistenceWriteFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("display initialization failed: {0}")]
    DisplayInitFailed(String),

    #[error("display error: {0}")]
    DisplayFailed(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ExperimentError {
    pub fn persistence(path: impl Into<PathBuf>, source: impl Into<csv::Error>) -> Self {
        Self::PersistenceWriteFailed {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, Self::AbortedByUser)
    }
}
