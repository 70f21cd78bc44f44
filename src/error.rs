use std::path::PathBuf;
use thiserror::Error;

/// Fatal configuration errors.
///
/// Everything here is raised before traversal begins — nothing is searched.
/// Per-entry failures during the walk (permission denied, race-deleted
/// files, broken symlinks) are never surfaced as errors: the entry is
/// skipped, the skip is counted in [`ScanStats::skipped`](crate::ScanStats),
/// and the run continues.
#[derive(Error, Debug)]
pub enum QryError {
    #[error("invalid scope: {0:?} is not a readable directory")]
    InvalidScope(PathBuf),

    #[error("invalid pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid size literal {0:?}")]
    InvalidSizeLiteral(String),

    #[error("invalid worker count {0}")]
    InvalidWorkerCount(usize),
}
