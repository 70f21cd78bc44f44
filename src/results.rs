use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};

use crossbeam_channel::Receiver;

use crate::config::SortKey;
use crate::query::MatchMode;

/// A single match, immutable once produced.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Absolute path of the matched file.
    pub path: PathBuf,
    /// The mode that actually matched. A `Both`-mode query reports
    /// `Filename` when the name matched and `Content` when the scan did.
    pub mode: MatchMode,
    /// Size in bytes at evaluation time.
    pub size: u64,
    /// Modification timestamp at evaluation time.
    pub modified: SystemTime,
    /// Matching line plus surrounding context, content mode with previews
    /// enabled only.
    pub preview: Option<String>,
}

/// How a run ended.
///
/// Truncation and cancellation are observable outcomes, not errors — in
/// both cases every match already emitted remains valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every eligible directory was visited.
    Complete,
    /// The max-results cap was reached; traversal stopped early.
    Truncated,
    /// The run was interrupted; results are partial.
    Cancelled,
}

/// Performance statistics for a completed run.
#[derive(Debug, Clone)]
pub struct ScanStats {
    /// Files evaluated (matched or not).
    pub files: usize,
    /// Directories visited.
    pub dirs: usize,
    /// Entries skipped due to access errors.
    pub skipped: usize,
    /// Wall-clock time from run start.
    pub duration: Duration,
    /// Entries evaluated per second, 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, skipped: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self { files, dirs, skipped, duration, entries_per_sec: eps }
    }
}

/// The output of an eager [`run()`](crate::SearchBuilder::run).
#[derive(Debug)]
pub struct SearchResults {
    /// Matches, sorted if a sort key was configured, otherwise in emission
    /// order.
    pub matches: Vec<MatchResult>,
    pub outcome: Outcome,
    pub stats: ScanStats,
}

/// Shared cooperative cancellation signal.
///
/// Checked by every worker between entries and by the scheduler between
/// dispatch cycles, so propagation latency is bounded by the time to
/// finish the current entry. Cloning hands out another handle to the same
/// signal.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Messages on the scheduler → consumer channel.
pub(crate) enum Event {
    Found(MatchResult),
    End { outcome: Outcome, stats: ScanStats },
}

/// Lazy, cancellable sequence of matches.
///
/// The canonical streaming form: each match is yielded as soon as it is
/// found, unless a sort key was configured — sorting requires buffering
/// the full result set before the first item is available.
///
/// Dropping the stream mid-iteration triggers the same cancellation path
/// as [`CancelToken::cancel`] and joins all engine threads, so no
/// filesystem access outlives the consumer.
pub struct ResultStream {
    rx: Receiver<Event>,
    cancel: CancelToken,
    sort_by: Option<SortKey>,
    sorted: Option<std::vec::IntoIter<MatchResult>>,
    outcome: Option<Outcome>,
    stats: Option<ScanStats>,
    handles: Vec<JoinHandle<()>>,
}

impl ResultStream {
    pub(crate) fn new(
        rx: Receiver<Event>,
        cancel: CancelToken,
        sort_by: Option<SortKey>,
        handles: Vec<JoinHandle<()>>,
    ) -> Self {
        Self { rx, cancel, sort_by, sorted: None, outcome: None, stats: None, handles }
    }

    /// Handle for interrupting the run from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// How the run ended. `None` until the stream has been fully drained.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Scan statistics. `None` until the stream has been fully drained.
    pub fn stats(&self) -> Option<&ScanStats> {
        self.stats.as_ref()
    }

    fn recv_next(&mut self) -> Option<MatchResult> {
        while let Ok(event) = self.rx.recv() {
            match event {
                Event::Found(m) => return Some(m),
                Event::End { outcome, stats } => {
                    self.outcome = Some(outcome);
                    self.stats = Some(stats);
                    return None;
                }
            }
        }
        None
    }

    fn drain_sorted(&mut self, key: SortKey) -> std::vec::IntoIter<MatchResult> {
        let mut all = Vec::new();
        while let Some(m) = self.recv_next() {
            all.push(m);
        }
        match key {
            SortKey::Name => all.sort_by(|a, b| a.path.cmp(&b.path)),
            SortKey::Size => all.sort_by(|a, b| a.size.cmp(&b.size)),
            SortKey::Date => all.sort_by(|a, b| a.modified.cmp(&b.modified)),
        }
        all.into_iter()
    }
}

impl Iterator for ResultStream {
    type Item = MatchResult;

    fn next(&mut self) -> Option<MatchResult> {
        if let Some(sorted) = &mut self.sorted {
            return sorted.next();
        }
        if let Some(key) = self.sort_by {
            let sorted = self.drain_sorted(key);
            self.sorted = Some(sorted);
            return self.sorted.as_mut().and_then(|it| it.next());
        }
        self.recv_next()
    }
}

impl Drop for ResultStream {
    fn drop(&mut self) {
        // Consumer walked away: same path as an external interrupt.
        self.cancel.cancel();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}
