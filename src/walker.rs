use std::fs;
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::trace;

use crate::cache::{PatternCache, StatCache};
use crate::classify::{classify, PriorityTier};
use crate::config::SearchConfig;
use crate::entry::CandidateEntry;
use crate::filter;
use crate::matcher::{self, MatchOutcome};
use crate::query::Query;
use crate::results::{CancelToken, MatchResult};
use crate::scheduler::{Task, WorkerMsg};

/// Read-only state shared by every worker.
pub(crate) struct WalkContext {
    pub config: Arc<SearchConfig>,
    pub query: Arc<Query>,
    pub stat_cache: Arc<StatCache>,
    pub patterns: Arc<PatternCache>,
    pub cancel: CancelToken,
    pub msg_tx: Sender<WorkerMsg>,
}

/// Walk one directory: evaluate its files, report its subdirectories.
///
/// Entries are processed in lexical order so per-directory emission is
/// deterministic. Unreadable entries are counted and skipped — a single
/// bad entry never aborts the run. The cancel flag is checked between
/// entries, which bounds cancellation latency to one entry's work.
pub(crate) fn walk_dir(task: &Task, ctx: &WalkContext) {
    let mut files = 0usize;
    let mut skipped = 0usize;

    let reader = match fs::read_dir(&task.dir) {
        Ok(reader) => reader,
        Err(err) => {
            trace!(dir = %task.dir.display(), %err, "directory unreadable, skipping");
            let _ = ctx.msg_tx.send(WorkerMsg::DirDone { files: 0, skipped: 1 });
            return;
        }
    };

    let mut entries: Vec<fs::DirEntry> = Vec::new();
    for entry in reader {
        match entry {
            Ok(e) => entries.push(e),
            Err(_) => skipped += 1,
        }
    }
    entries.sort_by_key(|e| e.file_name());

    let child_depth = task.depth + 1;
    let files_allowed = ctx.config.max_depth.map_or(true, |d| child_depth <= d);
    let descent_allowed = ctx.config.max_depth.map_or(true, |d| child_depth < d);

    for entry in entries {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };

        // Symlinks are only honored when their target stays inside the
        // scope root; everything else is cycle-unsafe and dropped.
        if file_type.is_symlink() {
            match fs::canonicalize(&path) {
                Ok(target) if target.starts_with(&ctx.config.root) => {}
                Ok(_) => continue,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            }
        }

        let Some(stat) = ctx.stat_cache.stat(&path) else {
            skipped += 1;
            continue;
        };

        if stat.is_dir {
            if !descent_allowed {
                continue;
            }
            let tier = classify(&name, &ctx.config);
            if tier == PriorityTier::Excluded {
                trace!(dir = %path.display(), "pruned");
                continue;
            }
            let _ = ctx.msg_tx.send(WorkerMsg::Discovered {
                dir: path,
                depth: child_depth,
                tier,
            });
            continue;
        }

        if !files_allowed {
            continue;
        }

        files += 1;
        let candidate = CandidateEntry { path, name, depth: child_depth, stat };

        if !filter::passes(&candidate, &ctx.config) {
            continue;
        }

        match matcher::match_entry(&candidate, &ctx.query, &ctx.patterns, ctx.config.preview) {
            MatchOutcome::Matched { mode, preview } => {
                let _ = ctx.msg_tx.send(WorkerMsg::Found(MatchResult {
                    path: candidate.path,
                    mode,
                    size: candidate.stat.size,
                    modified: candidate.stat.modified,
                    preview,
                }));
            }
            MatchOutcome::NoMatch => {}
            MatchOutcome::Skipped => skipped += 1,
        }
    }

    let _ = ctx.msg_tx.send(WorkerMsg::DirDone { files, skipped });
}
