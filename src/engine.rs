use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::debug;

use crate::cache::{PatternCache, StatCache};
use crate::classify::PriorityTier;
use crate::config::SearchConfig;
use crate::query::Query;
use crate::results::{CancelToken, Event, Outcome, ResultStream, ScanStats};
use crate::scheduler::{SchedulerState, Task, WorkerMsg};
use crate::walker::{self, WalkContext};

/// Granularity of the scheduler's dispatch cycle. Bounds how late a
/// timeout expansion or cancellation check can fire when no worker
/// messages are arriving.
const TICK: Duration = Duration::from_millis(25);

/// Wire up channels, spawn the worker pool and the scheduler thread, and
/// hand the consumer the streaming end.
///
/// All parallelism lives here and in the scheduler loop. Workers pull one
/// directory per task and never recurse; everything they learn flows back
/// as [`WorkerMsg`] so the scheduler stays the single owner of tier state
/// and the match count.
pub(crate) fn spawn(config: SearchConfig, query: Query, patterns: PatternCache) -> ResultStream {
    let sort_by = config.sort_by;
    let config = Arc::new(config);
    let query = Arc::new(query);
    let patterns = Arc::new(patterns);
    let stat_cache = Arc::new(StatCache::new());
    let cancel = CancelToken::new();

    let (task_tx, task_rx) = unbounded::<Task>();
    let (msg_tx, msg_rx) = unbounded::<WorkerMsg>();
    let (out_tx, out_rx) = unbounded::<Event>();

    let mut handles = Vec::with_capacity(config.threads + 1);

    for _ in 0..config.threads {
        let ctx = WalkContext {
            config: Arc::clone(&config),
            query: Arc::clone(&query),
            stat_cache: Arc::clone(&stat_cache),
            patterns: Arc::clone(&patterns),
            cancel: cancel.clone(),
            msg_tx: msg_tx.clone(),
        };
        let task_rx = task_rx.clone();
        handles.push(thread::spawn(move || worker_loop(task_rx, ctx)));
    }
    // The scheduler holds the only remaining message sender besides the
    // workers; dropping ours lets the channel close when everyone is done.
    drop(msg_tx);
    drop(task_rx);

    let scheduler_cancel = cancel.clone();
    let scheduler_config = Arc::clone(&config);
    handles.push(thread::spawn(move || {
        scheduler_loop(scheduler_config, task_tx, msg_rx, out_tx, scheduler_cancel);
    }));

    ResultStream::new(out_rx, cancel, sort_by, handles)
}

fn worker_loop(task_rx: Receiver<Task>, ctx: WalkContext) {
    while let Ok(task) = task_rx.recv() {
        if ctx.cancel.is_cancelled() {
            break;
        }
        walker::walk_dir(&task, &ctx);
    }
}

/// The scheduler: sole owner of tier state, match count, and the result
/// cap. Runs until all tiers are exhausted, the cap is hit, or the cancel
/// flag is observed.
fn scheduler_loop(
    config: Arc<SearchConfig>,
    task_tx: Sender<Task>,
    msg_rx: Receiver<WorkerMsg>,
    out_tx: Sender<Event>,
    cancel: CancelToken,
) {
    let started = Instant::now();
    let mut state = SchedulerState::new(config.priority_mode, config.incremental_timeout);
    let mut files = 0usize;
    let mut dirs = 0usize;
    let mut skipped = 0usize;
    let mut outcome = Outcome::Complete;

    // The root is walked unconditionally, at the top tier.
    if let Some(task) = state.admit(
        Task { dir: config.root.clone(), depth: 0 },
        PriorityTier::Source,
    ) {
        let _ = task_tx.send(task);
    }

    loop {
        if cancel.is_cancelled() {
            outcome = Outcome::Cancelled;
            break;
        }

        match msg_rx.recv_timeout(TICK) {
            Ok(WorkerMsg::Found(result)) => {
                state.on_match();
                let _ = out_tx.send(Event::Found(result));
                if let Some(cap) = config.max_results {
                    if state.matches() >= cap {
                        debug!(cap, "max results reached, truncating");
                        outcome = Outcome::Truncated;
                        cancel.cancel();
                        break;
                    }
                }
            }
            Ok(WorkerMsg::Discovered { dir, depth, tier }) => {
                if let Some(task) = state.admit(Task { dir, depth }, tier) {
                    let _ = task_tx.send(task);
                }
            }
            Ok(WorkerMsg::DirDone { files: f, skipped: s }) => {
                dirs += 1;
                files += f;
                skipped += s;
                state.on_dir_done();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for task in state.maybe_advance(started.elapsed()) {
            let _ = task_tx.send(task);
        }

        if state.is_exhausted() {
            break;
        }
    }

    // Workers blocked on the task channel wake up and exit once this
    // sender is gone; in-flight walks notice the cancel flag between
    // entries.
    drop(task_tx);

    let stats = ScanStats::compute(files, dirs, skipped, started.elapsed());
    debug!(
        ?outcome,
        matches = state.matches(),
        files = stats.files,
        dirs = stats.dirs,
        skipped = stats.skipped,
        duration = ?stats.duration,
        "run finished"
    );
    let _ = out_tx.send(Event::End { outcome, stats });
}
