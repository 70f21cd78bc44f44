use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::classify::PriorityTier;
use crate::results::MatchResult;

/// One unit of work: walk a single directory. Discovered subdirectories
/// come back to the scheduler as [`WorkerMsg::Discovered`] — workers never
/// recurse, which keeps the call stack flat and gives the scheduler full
/// control over ordering and cancellation granularity.
#[derive(Debug)]
pub(crate) struct Task {
    pub dir: PathBuf,
    pub depth: usize,
}

/// Messages from workers back to the scheduler. Workers never touch
/// scheduler state directly.
pub(crate) enum WorkerMsg {
    Found(MatchResult),
    Discovered {
        dir: PathBuf,
        depth: usize,
        tier: PriorityTier,
    },
    DirDone {
        files: usize,
        skipped: usize,
    },
}

/// Tier-scheduling state machine, owned exclusively by the scheduler loop.
///
/// The run moves `Active(tier)` downwards through the tier order. A
/// discovered directory at or above the active tier dispatches
/// immediately; lower tiers queue. The cursor advances two ways:
///
/// - drain: nothing in flight and queued tiers remain — move to the
///   highest non-empty tier;
/// - timeout expansion: the wall-clock budget has elapsed with zero
///   matches — activate the next non-empty tier without waiting for the
///   current one to drain. Tiers then run concurrently and cross-tier
///   emission order becomes best-effort.
///
/// With priority mode off the cursor starts at the bottom, so every
/// discovered directory dispatches at once (exclusion pruning still
/// applies — that happens in the walker before discovery is reported).
pub(crate) struct SchedulerState {
    pending: BTreeMap<PriorityTier, VecDeque<Task>>,
    active: PriorityTier,
    in_flight: usize,
    matches: usize,
    timeout: Duration,
}

impl SchedulerState {
    pub fn new(priority_mode: bool, timeout: Duration) -> Self {
        let active = if priority_mode { PriorityTier::Source } else { PriorityTier::Low };
        Self {
            pending: BTreeMap::new(),
            active,
            in_flight: 0,
            matches: 0,
            timeout,
        }
    }

    /// Admit a discovered directory. Returns the task if it should be
    /// dispatched now; otherwise it is queued under its tier.
    pub fn admit(&mut self, task: Task, tier: PriorityTier) -> Option<Task> {
        debug_assert_ne!(tier, PriorityTier::Excluded, "pruned dirs never reach the scheduler");
        if tier >= self.active {
            self.in_flight += 1;
            Some(task)
        } else {
            self.pending.entry(tier).or_default().push_back(task);
            None
        }
    }

    pub fn on_dir_done(&mut self) {
        self.in_flight -= 1;
    }

    pub fn on_match(&mut self) {
        self.matches += 1;
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Advance the tier cursor if warranted; returns newly dispatchable
    /// tasks. `elapsed` is wall-clock time since run start.
    pub fn maybe_advance(&mut self, elapsed: Duration) -> Vec<Task> {
        // Timeout expansion: budget spent, still nothing found. Expands one
        // tier per call; repeated calls cascade further if matches stay at
        // zero.
        if self.matches == 0 && elapsed >= self.timeout {
            if let Some(tasks) = self.activate_next_tier() {
                debug!(tier = ?self.active, elapsed = ?elapsed, "incremental timeout: expanding to lower tier");
                return tasks;
            }
        }

        // Drain: the dispatched tiers are exhausted, queued ones remain.
        if self.in_flight == 0 && !self.pending.is_empty() {
            if let Some(tasks) = self.activate_next_tier() {
                debug!(tier = ?self.active, "tier drained: advancing");
                return tasks;
            }
        }

        Vec::new()
    }

    /// Move the cursor to the highest non-empty queued tier and take its
    /// tasks. `None` when nothing is queued below the cursor.
    fn activate_next_tier(&mut self) -> Option<Vec<Task>> {
        let tier = *self.pending.keys().next_back()?;
        let queue = self.pending.remove(&tier)?;
        self.active = tier;
        self.in_flight += queue.len();
        Some(queue.into())
    }

    /// All tiers exhausted, nothing running.
    pub fn is_exhausted(&self) -> bool {
        self.in_flight == 0 && self.pending.is_empty()
    }
}
