//! # qry
//!
//! Priority-scheduled local file search — streaming, cancellable,
//! embeddable.
//!
//! qry walks a directory scope with a bounded worker pool and finds files
//! by name or content. Traversal is priority-biased: directories likely to
//! matter (`src`, `tests`, `config`, …) are searched first, and lower
//! tiers are only expanded when the higher ones drain or a wall-clock
//! budget passes without a match. Results stream to the consumer as they
//! are found, the run can be cancelled at any point, and partial results
//! stay valid.
//!
//! # Quick Start
//!
//! ```rust
//! let dir = tempfile::tempdir()?;
//! std::fs::write(dir.path().join("invoice_jan.txt"), "total: 100")?;
//! std::fs::write(dir.path().join("report.txt"), "nothing here")?;
//!
//! let results = qry::search()
//!     .scope(dir.path())
//!     .query("invoice")
//!     .run()?;
//!
//! assert_eq!(results.matches.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Streaming and cancellation
//!
//! [`SearchBuilder::run_iter`] is the canonical form: it yields each
//! [`MatchResult`] as soon as a worker finds it. Stopping iteration (or
//! dropping the stream) takes the same path as an external interrupt —
//! workers are signaled, in-flight entries finish, and everything already
//! yielded remains valid.
//!
//! ```rust,no_run
//! use qry::MatchMode;
//!
//! let stream = qry::search()
//!     .scope("/data")
//!     .query("TODO OR FIXME")
//!     .mode(MatchMode::Content)
//!     .preview(true)
//!     .run_iter()?;
//!
//! let cancel = stream.cancel_token();
//! for result in stream.take(20) {
//!     println!("{}", result.path.display());
//! }
//! # let _ = cancel;
//! # Ok::<(), qry::QryError>(())
//! ```
//!
//! # What is not an error
//!
//! Unreadable entries are skipped and counted, binary files are content
//! non-matches, and both truncation (max results) and cancellation are
//! ordinary [`Outcome`] values. Only configuration problems — bad scope,
//! invalid regex, invalid size literal, zero workers — fail a run, and
//! they fail it before any traversal starts.

#![forbid(unsafe_code)]

mod builder;
mod cache;
mod classify;
mod config;
mod engine;
mod entry;
mod error;
mod filter;
mod matcher;
mod query;
mod results;
mod scheduler;
mod walker;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use classify::PriorityTier;
pub use config::{parse_size, SortKey, DEFAULT_EXCLUDES};
pub use error::QryError;
pub use query::MatchMode;
pub use results::{CancelToken, MatchResult, Outcome, ResultStream, ScanStats, SearchResults};

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a search.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir()?;
/// std::fs::write(dir.path().join("notes.md"), "remember the milk")?;
///
/// let results = qry::search()
///     .scope(dir.path())
///     .query("notes")
///     .run()?;
///
/// assert_eq!(results.matches.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
