//! Parallel salt search.
//!
//! Workers claim consecutive blocks of attempt indices in ascending order,
//! report matches over a channel, and stop once no unclaimed block can hold
//! a smaller match than the best one seen. The result is the same as a
//! single-threaded scan.

mod cpu;
mod pool;

pub use cpu::{CpuWorker, WorkerStats, BLOCK_SIZE};
pub use pool::WorkerPool;
