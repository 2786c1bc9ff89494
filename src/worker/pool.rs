//! Worker pool management.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::ops::Range;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::search::{ProgressCallback, SaltMatch, SearchOutcome, SearchParams};

use super::cpu::{CpuWorker, SharedSearch, NO_MATCH};

/// How often the coordinator wakes up to check the time budget.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs one salt search across a pool of threads.
pub struct WorkerPool {
    handles: Option<Vec<JoinHandle<()>>>,
    result_rx: Receiver<SaltMatch>,
    shared: Arc<SharedSearch>,
    deadline: Option<Instant>,
    outcome: Option<SearchOutcome>,
}

impl WorkerPool {
    pub(crate) fn new(
        num_workers: usize,
        params: SearchParams,
        indices: Range<u64>,
        max_duration: Option<Duration>,
        progress_every: u64,
        on_progress: Option<ProgressCallback>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        // Unbounded so a worker never blocks on send while the pool is dropped.
        let (result_tx, result_rx) = unbounded();
        let start_time = Instant::now();

        log::info!(
            "searching {} with {} worker(s) from attempt {}, seed offset {}",
            params.criteria,
            num_workers,
            indices.start + 1,
            params.seed_offset()
        );

        let shared = Arc::new(SharedSearch {
            params,
            first_index: indices.start,
            limit: indices.end,
            next_block: AtomicU64::new(indices.start),
            best_index: AtomicU64::new(NO_MATCH),
            stop_flag,
            halted: AtomicBool::new(false),
            budget_exhausted: AtomicBool::new(false),
            stats: Default::default(),
            progress_every,
            on_progress,
            start_time,
        });

        let handles = Self::spawn_workers(num_workers, &shared, result_tx);

        Self {
            handles: Some(handles),
            result_rx,
            shared,
            deadline: max_duration.map(|d| start_time + d),
            outcome: None,
        }
    }

    fn spawn_workers(
        num_workers: usize,
        shared: &Arc<SharedSearch>,
        result_tx: Sender<SaltMatch>,
    ) -> Vec<JoinHandle<()>> {
        (0..num_workers)
            .map(|id| {
                let shared = shared.clone();
                let result_tx = result_tx.clone();
                thread::Builder::new()
                    .name(format!("create2-worker-{}", id))
                    .spawn(move || CpuWorker::new(id, shared, result_tx).run())
                    .expect("Failed to spawn worker thread")
            })
            .collect()
    }

    /// Blocks until every worker has exited and returns the outcome.
    ///
    /// The channel closes once the last worker drops its sender, which
    /// happens only after all blocks below the best match are scanned.
    /// Without a match the scanned indices are exactly
    /// `first_index..first_index + total_salts()`, so the reported
    /// `attempts` can be fed back as a resume point.
    pub fn wait(&mut self) -> SearchOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let mut best: Option<SaltMatch> = None;

        loop {
            let timeout = match self.deadline {
                Some(_) if self.shared.budget_exhausted.load(Ordering::Relaxed) => POLL_INTERVAL,
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .min(POLL_INTERVAL),
                None => POLL_INTERVAL,
            };
            match self.result_rx.recv_timeout(timeout) {
                Ok(found) => {
                    if best.map_or(true, |b| found.attempts < b.attempts) {
                        best = Some(found);
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if self.deadline.is_some_and(|d| Instant::now() >= d) {
                        self.shared.budget_exhausted.store(true, Ordering::Relaxed);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.join_workers();

        let attempts = self.shared.first_index + self.total_salts();
        let outcome = match best {
            Some(found) => SearchOutcome::Found(found),
            None if self.shared.budget_exhausted.load(Ordering::Relaxed) => {
                SearchOutcome::NotFoundWithinBudget { attempts }
            }
            None if self.is_stopped() => SearchOutcome::Cancelled { attempts },
            None => SearchOutcome::NotFoundWithinBudget { attempts },
        };
        log::info!(
            "search finished after {} salts in {:.2}s: {:?}",
            self.total_salts(),
            self.elapsed().as_secs_f64(),
            outcome
        );
        self.outcome = Some(outcome);
        outcome
    }

    fn join_workers(&mut self) {
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Salts tried by this run.
    pub fn total_salts(&self) -> u64 {
        self.shared.stats.total_salts()
    }

    pub fn total_matches(&self) -> u64 {
        self.shared.stats.total_matches()
    }

    pub fn elapsed(&self) -> Duration {
        self.shared.start_time.elapsed()
    }

    pub fn salts_per_second(&self) -> f64 {
        let t = self.elapsed().as_secs_f64();
        if t > 0.0 {
            self.total_salts() as f64 / t
        } else {
            0.0
        }
    }

    fn is_stopped(&self) -> bool {
        self.shared.stop_flag.load(Ordering::Relaxed) || self.shared.halted.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    /// Halts this pool's workers only; the caller's stop flag is left alone.
    fn drop(&mut self) {
        if self.handles.is_some() {
            self.shared.halted.store(true, Ordering::Relaxed);
            self.join_workers();
        }
    }
}
