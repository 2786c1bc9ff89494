//! The salt finder.
//!
//! Attempt `i` (0-based) tests salt `keccak256(seed_label) + 1 + i`. The
//! result is the smallest matching attempt, whatever the number of workers.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use crate::crypto::{create2_address, Address, Salt, DEFAULT_DEPLOYER};
use crate::matcher::{Criteria, CriteriaError};
use crate::worker::WorkerPool;

/// Default cadence of progress callbacks, in attempts.
pub const DEFAULT_PROGRESS_EVERY: u64 = 1_000_000;

/// Everything that is fixed for the duration of one search.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub deployer: Address,
    pub init_code_hash: [u8; 32],
    pub criteria: Criteria,
    pub seed_label: String,
}

impl SearchParams {
    pub fn new(
        deployer: Address,
        init_code_hash: [u8; 32],
        criteria: Criteria,
        seed_label: impl Into<String>,
    ) -> Self {
        Self {
            deployer,
            init_code_hash,
            criteria,
            seed_label: seed_label.into(),
        }
    }

    /// keccak256 of the seed label, read as an integer.
    pub fn seed_offset(&self) -> Salt {
        Salt::from_label(&self.seed_label)
    }

    /// Salt tested by attempt `index`.
    pub fn salt_at(&self, index: u64) -> Salt {
        self.seed_offset().wrapping_add_u64(1).wrapping_add_u64(index)
    }

    pub fn address_for(&self, salt: &Salt) -> Address {
        create2_address(&self.deployer, salt, &self.init_code_hash)
    }
}

/// A salt whose CREATE2 address satisfies the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaltMatch {
    pub salt: Salt,
    pub address: Address,
    /// 1-based position of the salt in the search order.
    pub attempts: u64,
}

impl SaltMatch {
    pub(crate) fn at(params: &SearchParams, index: u64, salt: Salt, address: Address) -> Self {
        debug_assert_eq!(params.salt_at(index), salt);
        Self {
            salt,
            address,
            attempts: index + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(SaltMatch),
    /// The attempt or time budget ran out first.
    NotFoundWithinBudget { attempts: u64 },
    /// The stop flag was raised before a match was found.
    Cancelled { attempts: u64 },
}

impl SearchOutcome {
    pub fn found(&self) -> Option<&SaltMatch> {
        match self {
            SearchOutcome::Found(m) => Some(m),
            _ => None,
        }
    }
}

/// Snapshot handed to progress callbacks.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub attempts: u64,
    pub elapsed: Duration,
}

impl Progress {
    pub fn salts_per_second(&self) -> f64 {
        let t = self.elapsed.as_secs_f64();
        if t > 0.0 {
            self.attempts as f64 / t
        } else {
            0.0
        }
    }
}

pub type ProgressCallback = Arc<dyn Fn(&Progress) + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("invalid criteria: {0}")]
    InvalidCriteria(#[from] CriteriaError),
    #[error("no match within {attempts} attempts")]
    NotFound { attempts: u64 },
}

/// Configurable salt search. Defaults to one worker, no budget, and no
/// progress reporting.
#[derive(Clone)]
pub struct SaltFinder {
    params: SearchParams,
    workers: usize,
    start_index: u64,
    max_attempts: Option<u64>,
    max_duration: Option<Duration>,
    progress_every: u64,
    on_progress: Option<ProgressCallback>,
    stop_flag: Arc<AtomicBool>,
}

impl SaltFinder {
    pub fn new(params: SearchParams) -> Self {
        Self {
            params,
            workers: 1,
            start_index: 0,
            max_attempts: None,
            max_duration: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            on_progress: None,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Number of worker threads; values below one are treated as one.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Skips the first `attempts` salts, which an earlier run already
    /// scanned (the `attempts` of `NotFoundWithinBudget` or `Cancelled`).
    /// Reported attempt counts stay absolute.
    pub fn resume_from(mut self, attempts: u64) -> Self {
        self.start_index = attempts;
        self
    }

    /// Salts to try in this run, counted from the resume point.
    pub fn max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    pub fn max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }

    /// Attempts between progress callbacks (0 disables them).
    pub fn progress_every(mut self, every: u64) -> Self {
        self.progress_every = every;
        self
    }

    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Shares an external stop flag (e.g. set from a Ctrl-C handler).
    pub fn stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = flag;
        self
    }

    /// Spawns the workers without waiting for them.
    pub fn spawn(&self) -> WorkerPool {
        WorkerPool::new(
            self.workers,
            self.params.clone(),
            self.start_index..self
                .start_index
                .saturating_add(self.max_attempts.unwrap_or(u64::MAX)),
            self.max_duration,
            self.progress_every,
            self.on_progress.clone(),
            self.stop_flag.clone(),
        )
    }

    /// Runs the search to completion.
    pub fn run(&self) -> SearchOutcome {
        self.spawn().wait()
    }
}

/// Finds the first salt, counting up from `1 + keccak256(seed_label)`, whose
/// address under the default deployer starts with `prefix` and ends with
/// `suffix`. Single worker, no attempt or time budget.
pub fn find_salt(
    prefix: &str,
    suffix: &str,
    seed_label: &str,
    init_code_hash: [u8; 32],
) -> Result<SaltMatch, SearchError> {
    let criteria = Criteria::new(prefix, suffix)?;
    let params = SearchParams::new(DEFAULT_DEPLOYER, init_code_hash, criteria, seed_label);
    match SaltFinder::new(params).run() {
        SearchOutcome::Found(m) => Ok(m),
        SearchOutcome::NotFoundWithinBudget { attempts } | SearchOutcome::Cancelled { attempts } => {
            Err(SearchError::NotFound { attempts })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{init_code_hash, keccak256};
    use std::sync::atomic::{AtomicU64, Ordering};

    fn test_hash() -> [u8; 32] {
        keccak256(b"create2_vanity test init code")
    }

    fn params(prefix: &str, suffix: &str, seed: &str) -> SearchParams {
        SearchParams::new(
            DEFAULT_DEPLOYER,
            test_hash(),
            Criteria::new(prefix, suffix).unwrap(),
            seed,
        )
    }

    /// Straight-line reference search.
    fn sequential(params: &SearchParams, limit: u64) -> Option<SaltMatch> {
        (0..limit).find_map(|i| {
            let salt = params.salt_at(i);
            let address = params.address_for(&salt);
            params
                .criteria
                .matches(&address)
                .then(|| SaltMatch::at(params, i, salt, address))
        })
    }

    #[test]
    fn test_first_salt_follows_seed() {
        let p = params("", "", "test-seed");
        assert_eq!(p.salt_at(0), Salt::from_label("test-seed").wrapping_add_u64(1));
        assert_eq!(p.salt_at(9), Salt::from_label("test-seed").wrapping_add_u64(10));
    }

    #[test]
    fn test_empty_criteria_match_first_salt() {
        let found = find_salt("", "", "test-seed", test_hash()).unwrap();
        assert_eq!(found.attempts, 1);
        assert_eq!(found.salt, Salt::from_label("test-seed").wrapping_add_u64(1));
    }

    #[test]
    fn test_find_salt_scenario() {
        let a = find_salt("0x00", "00", "test-seed", test_hash()).unwrap();
        let hex = a.address.to_hex();
        assert!(hex.starts_with("00"));
        assert!(hex.ends_with("00"));

        // recomputes to the same address
        assert_eq!(create2_address(&DEFAULT_DEPLOYER, &a.salt, &test_hash()), a.address);

        // deterministic
        let b = find_salt("0x00", "00", "test-seed", test_hash()).unwrap();
        assert_eq!(a, b);

        assert_eq!(a.attempts, 117_620);
        assert_eq!(
            a.salt.to_hex(),
            "9c79018b6c5d4791ff092ce986fde8a2eebf921ea2473066e37bc4bba8e070ad"
        );
        assert_eq!(a.address.to_hex(), "0065e0815770a642cb043c5ccbefec24d1417800");
    }

    #[test]
    fn test_result_is_minimal() {
        let p = params("0", "a", "minimal");
        let found = SaltFinder::new(p.clone()).run();
        let expected = sequential(&p, 100_000).unwrap();
        assert_eq!(expected.attempts, 351);
        assert_eq!(found, SearchOutcome::Found(expected));

        // same check on the hex strings, without Criteria
        let is_match = |i: u64| {
            let hex = p.address_for(&p.salt_at(i)).to_hex();
            hex.starts_with('0') && hex.ends_with('a')
        };
        assert!(is_match(350));
        assert!((0..350).all(|i| !is_match(i)));
    }

    #[test]
    fn test_worker_count_does_not_change_result() {
        let p = params("ab", "c", "parallel");
        let single = SaltFinder::new(p.clone()).run();
        let multi = SaltFinder::new(p).workers(4).run();
        assert_eq!(single.found().map(|m| m.attempts), Some(1451));
        assert_eq!(single, multi);
    }

    #[test]
    fn test_seed_changes_result() {
        let a = find_salt("a", "", "seed-a", test_hash()).unwrap();
        let b = find_salt("a", "", "seed-b", test_hash()).unwrap();
        assert_ne!(a.salt, b.salt);
    }

    #[test]
    fn test_init_code_changes_result() {
        let other = init_code_hash(&[0x60, 0x00], &[0x01]);
        let a = find_salt("", "", "seed", test_hash()).unwrap();
        let b = find_salt("", "", "seed", other).unwrap();
        assert_eq!(a.salt, b.salt);
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_attempt_budget() {
        // 16^10 expected attempts, 5000 allowed
        let outcome = SaltFinder::new(params("0000000000", "", "budget"))
            .workers(3)
            .max_attempts(5000)
            .run();
        assert_eq!(outcome, SearchOutcome::NotFoundWithinBudget { attempts: 5000 });
    }

    #[test]
    fn test_time_budget() {
        let outcome = SaltFinder::new(params(&"f".repeat(40), "", "timeout"))
            .workers(2)
            .max_duration(Duration::from_millis(200))
            .run();
        assert!(matches!(outcome, SearchOutcome::NotFoundWithinBudget { attempts } if attempts > 0));
    }

    #[test]
    fn test_pre_raised_stop_flag_cancels() {
        let flag = Arc::new(AtomicBool::new(true));
        let outcome = SaltFinder::new(params(&"f".repeat(40), "", "cancel"))
            .workers(2)
            .stop_flag(flag)
            .run();
        assert_eq!(outcome, SearchOutcome::Cancelled { attempts: 0 });
    }

    #[test]
    fn test_stop_flag_from_another_thread() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut pool = SaltFinder::new(params(&"f".repeat(40), "", "cancel"))
            .workers(2)
            .stop_flag(flag.clone())
            .spawn();
        std::thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::Relaxed);
        assert!(matches!(pool.wait(), SearchOutcome::Cancelled { .. }));
    }

    #[test]
    fn test_match_survives_interruption() {
        // "0...a" first matches at attempt 351, inside the first block. That
        // block is always the first one claimed, and claimed blocks are
        // finished, so raising the stop flag on the first progress report
        // must still return the smallest match.
        let p = params("0", "a", "minimal");
        let expected = sequential(&p, 100_000).unwrap();

        for workers in [1, 2, 4, 8] {
            let flag = Arc::new(AtomicBool::new(false));
            let raise = flag.clone();
            let outcome = SaltFinder::new(p.clone())
                .workers(workers)
                .stop_flag(flag.clone())
                .progress_every(1)
                .on_progress(move |_| raise.store(true, Ordering::Relaxed))
                .run();
            assert!(flag.load(Ordering::Relaxed));
            assert_eq!(outcome, SearchOutcome::Found(expected), "{} workers", workers);
        }
    }

    #[test]
    fn test_dropped_pool_does_not_poison_finder() {
        let p = params("0", "a", "minimal");
        let flag = Arc::new(AtomicBool::new(false));
        let finder = SaltFinder::new(p).workers(2).stop_flag(flag.clone());

        drop(finder.spawn());
        assert!(!flag.load(Ordering::Relaxed));

        let outcome = finder.clone().run();
        assert_eq!(outcome.found().map(|m| m.attempts), Some(351));
        assert_eq!(finder.run(), outcome);
    }

    #[test]
    fn test_resume_after_budget() {
        let p = params("ab", "c", "parallel");
        let full = SaltFinder::new(p.clone()).run();

        // 700 is not a multiple of the block size
        let first = SaltFinder::new(p.clone()).workers(3).max_attempts(700).run();
        assert_eq!(first, SearchOutcome::NotFoundWithinBudget { attempts: 700 });

        let second = SaltFinder::new(p.clone()).workers(3).resume_from(700).max_attempts(500).run();
        assert_eq!(second, SearchOutcome::NotFoundWithinBudget { attempts: 1200 });

        let third = SaltFinder::new(p).workers(3).resume_from(1200).run();
        assert_eq!(third, full);
        assert_eq!(third.found().map(|m| m.attempts), Some(1451));
    }

    #[test]
    fn test_resume_past_match_skips_it() {
        let p = params("0", "a", "minimal");
        let outcome = SaltFinder::new(p.clone()).resume_from(351).run();
        let found = outcome.found().copied().unwrap();
        assert!(found.attempts > 351);
        assert_eq!(found.salt, p.salt_at(found.attempts - 1));
    }

    #[test]
    fn test_pool_stats_after_wait() {
        let mut pool = SaltFinder::new(params("0000000000", "", "stats"))
            .workers(2)
            .max_attempts(3000)
            .spawn();
        let outcome = pool.wait();
        assert_eq!(outcome, SearchOutcome::NotFoundWithinBudget { attempts: 3000 });
        assert_eq!(pool.total_salts(), 3000);
        assert_eq!(pool.total_matches(), 0);
        assert!(pool.salts_per_second() > 0.0);
        // waiting again reports the same outcome
        assert_eq!(pool.wait(), outcome);
    }

    #[test]
    fn test_progress_cadence() {
        let calls = Arc::new(AtomicU64::new(0));
        let seen = calls.clone();
        let outcome = SaltFinder::new(params("0000000000", "", "progress"))
            .max_attempts(10_000)
            .progress_every(2_500)
            .on_progress(move |p| {
                assert!(p.attempts >= 2_500);
                seen.fetch_add(1, Ordering::Relaxed);
            })
            .run();
        assert!(matches!(outcome, SearchOutcome::NotFoundWithinBudget { .. }));
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_rejects_invalid_criteria() {
        assert!(matches!(
            find_salt("zz", "", "seed", test_hash()),
            Err(SearchError::InvalidCriteria(_))
        ));
        assert!(matches!(
            find_salt(&"0".repeat(30), &"0".repeat(11), "seed", test_hash()),
            Err(SearchError::InvalidCriteria(CriteriaError::TooLong(41)))
        ));
    }
}
