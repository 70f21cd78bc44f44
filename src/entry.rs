use std::path::PathBuf;
use std::time::SystemTime;

/// Filesystem metadata snapshot for one entry.
///
/// Captured once per path through the stat cache; filters and matchers
/// operate on this snapshot and never re-stat the filesystem.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FileStat {
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// A file being evaluated by the walker.
///
/// Owned transiently — built from a directory listing, passed through the
/// filter chain and matcher, then discarded. Only a successful match
/// escapes, as a [`MatchResult`](crate::MatchResult).
#[derive(Debug)]
pub(crate) struct CandidateEntry {
    /// Absolute path (the scope root is canonicalized up front).
    pub path: PathBuf,
    /// Base name, used for filename matching and extension filtering.
    pub name: String,
    /// Path segments below the scope root.
    pub depth: usize,
    pub stat: FileStat,
}

impl CandidateEntry {
    /// Lowercased extension without the leading dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
    }
}
