use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::error::QryError;

/// Directory names skipped by default when the caller does not override
/// exclusions: version control, virtual environments, bytecode and tooling
/// caches, build output, dependency trees.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".venv",
    "venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
    ".cache",
    ".idea",
    "node_modules",
    "build",
    "dist",
    "target",
];

/// Content scans never read more than this many bytes from a single file.
pub(crate) const MAX_CONTENT_BYTES: u64 = 10 * 1024 * 1024;

/// Lines of context captured on each side of a matching line when previews
/// are enabled.
pub(crate) const PREVIEW_CONTEXT_LINES: usize = 2;

/// Sort key for the final result set.
///
/// Sorting buffers the entire stream before the consumer sees the first
/// item — it trades streaming for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Size,
    Date,
}

/// Immutable configuration snapshot for one run.
///
/// Built and validated by [`SearchBuilder`](crate::SearchBuilder); shared
/// read-only across the scheduler and all workers.
#[derive(Debug)]
pub struct SearchConfig {
    /// Canonicalized scope root. All traversal stays underneath it.
    pub root: PathBuf,
    /// Maximum number of path segments below the root. `None` = unbounded.
    pub max_depth: Option<usize>,
    /// Extension allow-set, lowercase, no leading dot. Empty = all.
    pub file_types: HashSet<String>,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
    pub modified_after: Option<DateTime<Local>>,
    pub modified_before: Option<DateTime<Local>>,
    /// Directory names that prune traversal outright.
    pub exclude_dirs: HashSet<String>,
    pub threads: usize,
    /// `None` = unbounded.
    pub max_results: Option<usize>,
    pub sort_by: Option<SortKey>,
    pub preview: bool,
    /// Wall-clock budget after which lower tiers are activated if no match
    /// has been found yet.
    pub incremental_timeout: Duration,
    pub priority_mode: bool,
}

impl SearchConfig {
    pub(crate) fn has_date_bounds(&self) -> bool {
        self.modified_after.is_some() || self.modified_before.is_some()
    }
}

/// Parse a size literal into a byte count.
///
/// Accepts a decimal integer with an optional unit suffix. Units are
/// binary: `k`/`K`/`kb`/`KB` = 1024, `m`/`M`/`mb`/`MB` = 1024², and
/// `g`/`G`/`gb`/`GB` = 1024³. `"10k"` is 10240 bytes, `"1G"` is 2^30.
pub fn parse_size(literal: &str) -> Result<u64, QryError> {
    let s = literal.trim();
    let invalid = || QryError::InvalidSizeLiteral(literal.to_string());

    let digits_end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, suffix) = s.split_at(digits_end);
    if digits.is_empty() {
        return Err(invalid());
    }
    let base: u64 = digits.parse().map_err(|_| invalid())?;

    let multiplier: u64 = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1024,
        "m" | "mb" => 1024 * 1024,
        "g" | "gb" => 1024 * 1024 * 1024,
        _ => return Err(invalid()),
    };

    base.checked_mul(multiplier).ok_or_else(invalid)
}
