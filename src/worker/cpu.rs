//! CPU worker for CREATE2 salt search.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crossbeam_channel::Sender;

use crate::search::{Progress, ProgressCallback, SaltMatch, SearchParams};

/// Attempts per claimed block. Stop flags are checked between blocks.
pub const BLOCK_SIZE: u64 = 1000;

/// Sentinel for "no match yet" in [`SharedSearch::best_index`].
pub(crate) const NO_MATCH: u64 = u64::MAX;

#[derive(Debug, Default)]
pub struct WorkerStats {
    pub salts_tried: AtomicU64,
    pub matches_found: AtomicU64,
}

impl WorkerStats {
    pub fn total_salts(&self) -> u64 {
        self.salts_tried.load(Ordering::Relaxed)
    }

    pub fn total_matches(&self) -> u64 {
        self.matches_found.load(Ordering::Relaxed)
    }
}

/// State shared by every worker of one search.
///
/// Blocks of attempt indices are claimed in ascending order from
/// `next_block` and always scanned to the end (or to their first match), so
/// every index below a reported match has been tested by the time all
/// workers exit.
pub(crate) struct SharedSearch {
    pub(crate) params: SearchParams,
    /// First attempt index of this run; everything below it was scanned by
    /// an earlier run.
    pub(crate) first_index: u64,
    /// Exclusive upper bound on attempt indices.
    pub(crate) limit: u64,
    pub(crate) next_block: AtomicU64,
    /// Smallest matching index seen so far.
    pub(crate) best_index: AtomicU64,
    /// Caller's flag, possibly shared with other searches. Only read here.
    pub(crate) stop_flag: Arc<AtomicBool>,
    /// Raised when this pool is dropped before `wait`.
    pub(crate) halted: AtomicBool,
    pub(crate) budget_exhausted: AtomicBool,
    pub(crate) stats: WorkerStats,
    pub(crate) progress_every: u64,
    pub(crate) on_progress: Option<ProgressCallback>,
    pub(crate) start_time: Instant,
}

impl SharedSearch {
    fn interrupted(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
            || self.halted.load(Ordering::Relaxed)
            || self.budget_exhausted.load(Ordering::Relaxed)
    }

    /// Counts `n` more salts and fires the progress callback when the
    /// absolute attempt count crosses a multiple of `progress_every`.
    fn record_attempts(&self, n: u64) {
        let before = self.first_index + self.stats.salts_tried.fetch_add(n, Ordering::Relaxed);
        let after = before + n;
        if self.progress_every == 0 || before / self.progress_every == after / self.progress_every {
            return;
        }
        if let Some(callback) = &self.on_progress {
            callback(&Progress {
                attempts: after,
                elapsed: self.start_time.elapsed(),
            });
        }
    }
}

pub struct CpuWorker {
    id: usize,
    shared: Arc<SharedSearch>,
    result_tx: Sender<SaltMatch>,
}

impl CpuWorker {
    pub(crate) fn new(id: usize, shared: Arc<SharedSearch>, result_tx: Sender<SaltMatch>) -> Self {
        Self {
            id,
            shared,
            result_tx,
        }
    }

    /// Claims and scans blocks until the index space below the best match
    /// (or the attempt limit) is used up, or the search is interrupted.
    pub fn run(&self) {
        let shared = &*self.shared;
        let params = &shared.params;

        loop {
            if shared.interrupted() {
                break;
            }

            let claimed = shared
                .next_block
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    Some(n.saturating_add(BLOCK_SIZE))
                });
            let Ok(start) = claimed else { break };
            if start >= shared.limit || start >= shared.best_index.load(Ordering::SeqCst) {
                break;
            }
            let end = start.saturating_add(BLOCK_SIZE).min(shared.limit);

            let mut salt = params.salt_at(start);
            let mut tried = 0;
            for index in start..end {
                tried += 1;
                let address = params.address_for(&salt);
                if params.criteria.matches(&address) {
                    shared.stats.matches_found.fetch_add(1, Ordering::Relaxed);
                    shared.best_index.fetch_min(index, Ordering::SeqCst);
                    log::debug!("worker {} matched at attempt {}: {}", self.id, index + 1, address);
                    // Cannot fail: the pool joins every worker (in `wait` or
                    // on drop) before its receiver is dropped.
                    let _ = self
                        .result_tx
                        .send(SaltMatch::at(params, index, salt, address));
                    break;
                }
                salt.increment();
            }

            shared.record_attempts(tried);
        }

        log::trace!("worker {} exiting", self.id);
    }
}
