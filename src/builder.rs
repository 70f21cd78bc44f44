use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;

use crate::cache::PatternCache;
use crate::config::{parse_size, SearchConfig, SortKey, DEFAULT_EXCLUDES};
use crate::engine;
use crate::error::QryError;
use crate::query::{MatchMode, Query};
use crate::results::{Outcome, ResultStream, ScanStats, SearchResults};

/// Entry point for configuring and executing a search.
///
/// Created via [`qry::search()`](crate::search). Configure with chained
/// methods, then call [`run()`](SearchBuilder::run) for a materialized
/// result set or [`run_iter()`](SearchBuilder::run_iter) for the
/// streaming form.
///
/// # Example
///
/// ```rust,ignore
/// let results = qry::search()
///     .scope("/data/projects")
///     .query("invoice")
///     .mode(MatchMode::Content)
///     .file_type("txt")
///     .max_results(50)
///     .run()?;
/// ```
pub struct SearchBuilder {
    scope: PathBuf,
    query_text: String,
    mode: MatchMode,
    regex: bool,
    max_depth: Option<usize>,
    file_types: Vec<String>,
    exclude_dirs: Vec<String>,
    use_default_excludes: bool,
    max_results: usize,
    min_size: Option<String>,
    max_size: Option<String>,
    modified_after: Option<chrono::NaiveDate>,
    modified_before: Option<chrono::NaiveDate>,
    last_days: Option<i64>,
    threads: usize,
    sort_by: Option<SortKey>,
    preview: bool,
    priority_mode: bool,
    incremental_timeout: Duration,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            scope: PathBuf::from("."),
            query_text: String::new(),
            mode: MatchMode::Filename,
            regex: false,
            max_depth: None,
            file_types: Vec::new(),
            exclude_dirs: Vec::new(),
            use_default_excludes: true,
            max_results: 0,
            min_size: None,
            max_size: None,
            modified_after: None,
            modified_before: None,
            last_days: None,
            threads: num_cpus(),
            sort_by: None,
            preview: false,
            priority_mode: true,
            incremental_timeout: Duration::from_millis(500),
        }
    }
}

impl SearchBuilder {
    // ── Query ─────────────────────────────────────────────────────────────

    /// Root directory the search is confined to. Defaults to `"."`.
    pub fn scope(mut self, path: impl Into<PathBuf>) -> Self {
        self.scope = path.into();
        self
    }

    /// The query text. Literal by default, case-insensitive; literal
    /// queries support `OR`-composition (`"TODO OR FIXME"`). Empty text
    /// with filename mode matches every name — useful for filter-only
    /// searches.
    pub fn query(mut self, text: impl Into<String>) -> Self {
        self.query_text = text.into();
        self
    }

    /// What to match against: filename, content, or both. Defaults to
    /// filename.
    pub fn mode(mut self, mode: MatchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Treat the query text as a regular expression. Compiled once per
    /// run; an invalid pattern fails [`run()`](Self::run), never a single
    /// file.
    pub fn regex(mut self, yes: bool) -> Self {
        self.regex = yes;
        self
    }

    // ── Filters ───────────────────────────────────────────────────────────

    /// Maximum number of path segments below the scope root. Unlimited by
    /// default.
    pub fn depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// Restrict results to one extension. Leading dots and case are
    /// normalized; repeatable.
    pub fn file_type(mut self, ext: impl Into<String>) -> Self {
        self.file_types.push(ext.into());
        self
    }

    /// Restrict results to a set of extensions.
    pub fn file_types<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file_types.extend(exts.into_iter().map(Into::into));
        self
    }

    /// Additional directory name to prune, on top of the defaults.
    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.exclude_dirs.push(name.into());
        self
    }

    /// Additional directory names to prune.
    pub fn exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs.extend(names.into_iter().map(Into::into));
        self
    }

    /// Disable the built-in exclusion set
    /// ([`DEFAULT_EXCLUDES`](crate::DEFAULT_EXCLUDES)): `.git`,
    /// `node_modules`, `__pycache__`, build output, and friends.
    pub fn no_default_excludes(mut self) -> Self {
        self.use_default_excludes = false;
        self
    }

    /// Minimum file size as a literal: plain bytes or `k`/`M`/`G`
    /// suffixed (binary units, so `"10k"` is 10240 bytes).
    pub fn min_size(mut self, literal: impl Into<String>) -> Self {
        self.min_size = Some(literal.into());
        self
    }

    /// Maximum file size literal, same syntax as [`min_size`](Self::min_size).
    pub fn max_size(mut self, literal: impl Into<String>) -> Self {
        self.max_size = Some(literal.into());
        self
    }

    /// Only files modified on or after this date.
    pub fn modified_after(mut self, date: chrono::NaiveDate) -> Self {
        self.modified_after = Some(date);
        self
    }

    /// Only files modified on or before this date.
    pub fn modified_before(mut self, date: chrono::NaiveDate) -> Self {
        self.modified_before = Some(date);
        self
    }

    /// Only files modified in the last `n` days, measured from now.
    pub fn last_days(mut self, n: u32) -> Self {
        self.last_days = Some(i64::from(n));
        self
    }

    // ── Execution shape ───────────────────────────────────────────────────

    /// Stop after `n` matches and report [`Outcome::Truncated`]. `0`
    /// (the default) means unbounded.
    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    /// Worker pool size. Defaults to the logical CPU count; zero is a
    /// configuration error.
    pub fn workers(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Sort the final result set. Costs streaming: with a sort key set,
    /// [`ResultStream`] buffers everything before yielding the first item.
    pub fn sort_by(mut self, key: SortKey) -> Self {
        self.sort_by = Some(key);
        self
    }

    /// Attach a preview snippet (matched line plus context) to content
    /// matches.
    pub fn preview(mut self, yes: bool) -> Self {
        self.preview = yes;
        self
    }

    /// Priority-biased traversal: important directories (`src`, `tests`,
    /// …) first, lower tiers on drain or timeout. On by default; off
    /// means every directory dispatches as soon as it is discovered.
    pub fn priority_mode(mut self, yes: bool) -> Self {
        self.priority_mode = yes;
        self
    }

    /// Wall-clock budget after which lower tiers are activated if nothing
    /// has matched yet. Defaults to 500 ms.
    pub fn incremental_timeout(mut self, timeout: Duration) -> Self {
        self.incremental_timeout = timeout;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Execute the search and collect all matches.
    ///
    /// Blocks until the run ends. Truncation (max-results) and
    /// cancellation are reported through [`SearchResults::outcome`], not
    /// as errors.
    ///
    /// # Errors
    ///
    /// Only configuration errors: bad scope, invalid regex, invalid size
    /// literal, zero workers. Per-entry failures during traversal are
    /// skipped and counted in [`ScanStats::skipped`](crate::ScanStats).
    pub fn run(self) -> Result<SearchResults, QryError> {
        let mut stream = self.run_iter()?;
        let mut matches = Vec::new();
        for m in stream.by_ref() {
            matches.push(m);
        }
        let outcome = stream.outcome().unwrap_or(Outcome::Complete);
        let stats = stream
            .stats()
            .cloned()
            .unwrap_or_else(|| ScanStats::compute(0, 0, 0, Duration::ZERO));
        Ok(SearchResults { matches, outcome, stats })
    }

    /// Execute the search and stream matches as they are found.
    ///
    /// The canonical form: the consumer may stop iterating (or drop the
    /// stream) at any point, which cancels the run exactly like an
    /// external interrupt would.
    pub fn run_iter(self) -> Result<ResultStream, QryError> {
        let (config, query, patterns) = self.validate()?;
        Ok(engine::spawn(config, query, patterns))
    }

    /// Validate every knob up front — nothing is searched if any of this
    /// fails.
    fn validate(self) -> Result<(SearchConfig, Query, PatternCache), QryError> {
        let root = std::fs::canonicalize(&self.scope)
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| QryError::InvalidScope(self.scope.clone()))?;

        if self.threads == 0 {
            return Err(QryError::InvalidWorkerCount(0));
        }

        let patterns = PatternCache::new();
        if self.regex {
            patterns
                .compile(&self.query_text)
                .map_err(|source| QryError::InvalidPattern {
                    pattern: self.query_text.clone(),
                    source,
                })?;
        }

        let min_size = self.min_size.as_deref().map(parse_size).transpose()?;
        let max_size = self.max_size.as_deref().map(parse_size).transpose()?;

        let mut modified_after = self
            .modified_after
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .and_then(|dt| dt.and_local_timezone(Local).single());
        let modified_before = self
            .modified_before
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .and_then(|dt| dt.and_local_timezone(Local).single());
        if let Some(days) = self.last_days {
            modified_after = Some(Local::now() - chrono::Duration::days(days));
        }

        let file_types: HashSet<String> = self
            .file_types
            .iter()
            .map(|e| e.trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        let mut exclude_dirs: HashSet<String> = self.exclude_dirs.into_iter().collect();
        if self.use_default_excludes {
            exclude_dirs.extend(DEFAULT_EXCLUDES.iter().map(|s| s.to_string()));
        }

        let config = SearchConfig {
            root,
            max_depth: self.max_depth,
            file_types,
            min_size,
            max_size,
            modified_after,
            modified_before,
            exclude_dirs,
            threads: self.threads,
            max_results: (self.max_results > 0).then_some(self.max_results),
            sort_by: self.sort_by,
            preview: self.preview,
            incremental_timeout: self.incremental_timeout,
            priority_mode: self.priority_mode,
        };

        let query = Query {
            text: self.query_text,
            mode: self.mode,
            regex: self.regex,
        };

        Ok((config, query, patterns))
    }
}

/// Get the logical CPU count, with a safe fallback.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
