use std::num::NonZeroUsize;
use std::thread;

use crate::sequential::floor_log2;

/// Tuning knobs for a [`SortEngine`](crate::SortEngine).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SortConfig {
    /// Upper bound on spawned worker threads. `None` uses hardware
    /// concurrency minus one. Always at least one.
    pub max_workers: Option<usize>,
    /// Partitions of at most this many elements are insertion sorted in
    /// place instead of being split. `0` splits all the way down.
    pub sequential_threshold: usize,
    pub depth_factor_num: usize,
    pub depth_factor_den: usize,
    pub worker_stack_size: Option<usize>,
    pub thread_name_prefix: &'static str,
}

pub const TUNED_CONFIG: SortConfig = SortConfig {
    max_workers: None,
    sequential_threshold: 24,
    depth_factor_num: 5,
    depth_factor_den: 2,
    worker_stack_size: None,
    thread_name_prefix: "pqsort-worker",
};

impl Default for SortConfig {
    fn default() -> Self {
        TUNED_CONFIG
    }
}

impl SortConfig {
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    pub fn with_sequential_threshold(mut self, threshold: usize) -> Self {
        self.sequential_threshold = threshold;
        self
    }

    pub fn with_worker_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = Some(bytes);
        self
    }

    pub fn with_thread_name_prefix(mut self, prefix: &'static str) -> Self {
        self.thread_name_prefix = prefix;
        self
    }

    /// Resolved worker cap for an engine built from this config.
    pub fn max_worker_count(&self) -> usize {
        self.max_workers
            .unwrap_or_else(default_max_worker_count)
            .max(1)
    }

    /// Number of partition levels a sequence of `len` elements may go
    /// through before the remainder is heap sorted.
    pub fn depth_budget(&self, len: usize) -> usize {
        (floor_log2(len) * self.depth_factor_num) / self.depth_factor_den.max(1) + 1
    }
}

/// Hardware concurrency minus the calling thread, never below one.
pub fn default_max_worker_count() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .saturating_sub(1)
        .max(1)
}
