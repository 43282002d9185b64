//! Work-stealing quicksort engine.
//!
//! The calling thread partitions its sequence around the first element,
//! pushes the lower part onto a shared [`WorkStack`] and keeps going with the
//! higher part. Workers are spawned lazily, one per split, until the cap is
//! reached. Nobody ever blocks on a result: a thread waiting for a lower
//! partition pops and sorts whatever is on the stack until its own result
//! shows up, so a job sitting on the stack is always claimed by someone.

use std::cmp::Ordering as CmpOrdering;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::error::panic_message;
use crate::job::{JobHandle, JobResult, SortJob};
use crate::stats::StatsCounters;
use crate::{SortConfig, SortError, SortStats, WorkStack, sequential};

/// Owns the work stack, the worker threads and the shutdown flag for a
/// sort. Dropping the engine stops and joins every worker it spawned.
pub struct SortEngine<T, F> {
    shared: Arc<Shared<T, F>>,
}

struct Shared<T, F> {
    stack: WorkStack<SortJob<T>>,
    compare: F,
    config: SortConfig,
    max_worker_count: usize,
    // Worker slots handed out so far, including failed spawns.
    reserved_workers: AtomicUsize,
    workers: Mutex<Vec<JoinHandle<()>>>,
    shutdown: AtomicBool,
    stats: StatsCounters,
}

impl<T, F> SortEngine<T, F>
where
    T: Send + 'static,
    F: Fn(&T, &T) -> CmpOrdering + Send + Sync + 'static,
{
    pub fn new(compare: F) -> Self {
        Self::with_config(compare, SortConfig::default())
    }

    /// Builds an engine. No thread is started until the first split.
    pub fn with_config(compare: F, config: SortConfig) -> Self {
        let max_worker_count = config.max_worker_count();
        debug!(max_worker_count, "creating sort engine");
        Self {
            shared: Arc::new(Shared {
                stack: WorkStack::new(),
                compare,
                config,
                max_worker_count,
                reserved_workers: AtomicUsize::new(0),
                workers: Mutex::new(Vec::new()),
                shutdown: AtomicBool::new(false),
                stats: StatsCounters::default(),
            }),
        }
    }

    /// Sorts `data` on the calling thread plus the engine's workers and
    /// blocks until every partition is back.
    pub fn sort(&self, data: Vec<T>) -> Result<Vec<T>, SortError> {
        let depth_budget = self.shared.config.depth_budget(data.len());
        self.shared.sort_guarded(data, depth_budget)
    }

    /// Stops the workers and returns the final counters.
    pub fn shutdown(self) -> SortStats {
        self.stop_workers();
        self.stats()
    }
}

impl<T, F> SortEngine<T, F> {
    pub fn max_worker_count(&self) -> usize {
        self.shared.max_worker_count
    }

    pub fn stats(&self) -> SortStats {
        self.shared.stats.snapshot()
    }

    fn stop_workers(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        // A worker may still spawn a sibling while it drains leftovers, so
        // keep joining until no handle is left.
        loop {
            let workers = mem::take(&mut *self.shared.workers.lock());
            if workers.is_empty() {
                break;
            }
            for handle in workers {
                if handle.join().is_err() {
                    warn!("sort worker terminated by a panic");
                }
            }
        }
        debug!(
            abandoned_jobs = self.shared.stack.len(),
            "sort engine shut down"
        );
    }
}

impl<T, F> Drop for SortEngine<T, F> {
    fn drop(&mut self) {
        self.stop_workers();
    }
}

impl<T, F> Shared<T, F>
where
    T: Send + 'static,
    F: Fn(&T, &T) -> CmpOrdering + Send + Sync + 'static,
{
    /// Runs `do_sort`, turning a comparator panic into an error result.
    fn sort_guarded(self: &Arc<Self>, data: Vec<T>, depth_budget: usize) -> JobResult<T> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.do_sort(data, depth_budget))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(&*payload);
                error!(%message, "comparator panicked; failing partition");
                Err(SortError::ComparatorPanicked(message))
            }
        }
    }

    fn do_sort(self: &Arc<Self>, mut chunk: Vec<T>, mut depth_budget: usize) -> JobResult<T> {
        let total_len = chunk.len();
        // (lower partition, pivot) per level, outermost first. The higher
        // side is walked iteratively, so stack depth does not grow with it.
        let mut levels = Vec::new();

        loop {
            if chunk.is_empty() {
                break;
            }
            if chunk.len() <= self.config.sequential_threshold {
                sequential::insertion_sort_by(&mut chunk, &self.compare);
                break;
            }
            if depth_budget == 0 {
                sequential::heap_sort_by(&mut chunk, &self.compare);
                break;
            }
            depth_budget -= 1;

            let (pivot, lower) = self.partition(&mut chunk);
            let lower = self.submit(lower, depth_budget);
            levels.push((lower, pivot));
        }

        let mut result = Vec::with_capacity(total_len);
        for (lower, pivot) in levels {
            let mut sorted_lower = self.help_until_ready(lower)?;
            result.append(&mut sorted_lower);
            result.push(pivot);
        }
        result.append(&mut chunk);
        Ok(result)
    }

    /// Takes the first element as pivot and moves everything that orders
    /// below it out of `chunk`. What remains in `chunk` is the higher part.
    fn partition(&self, chunk: &mut Vec<T>) -> (T, Vec<T>) {
        let pivot = chunk.swap_remove(0);
        let mut boundary = 0;
        for i in 0..chunk.len() {
            if (self.compare)(&chunk[i], &pivot) == CmpOrdering::Less {
                chunk.swap(boundary, i);
                boundary += 1;
            }
        }
        let lower = chunk.drain(..boundary).collect();
        (pivot, lower)
    }

    fn submit(self: &Arc<Self>, lower: Vec<T>, depth_budget: usize) -> JobHandle<T> {
        if lower.is_empty() {
            return JobHandle::resolved(Ok(lower));
        }

        let (job, handle) = SortJob::new(lower, depth_budget);
        trace!(len = job.len(), depth_budget, "pushing lower partition");
        self.stats.record_push();
        self.stack.push(job);
        self.maybe_spawn_worker();
        handle
    }

    fn maybe_spawn_worker(self: &Arc<Self>) {
        if self.shutdown.load(Ordering::Acquire) {
            return;
        }
        let reserved = self
            .reserved_workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.max_worker_count).then_some(n + 1)
            });
        let Ok(index) = reserved else {
            return;
        };

        let mut builder =
            thread::Builder::new().name(format!("{}-{index}", self.config.thread_name_prefix));
        if let Some(stack_size) = self.config.worker_stack_size {
            builder = builder.stack_size(stack_size);
        }

        self.stats.record_worker_starting();
        let shared = Arc::clone(self);
        match builder.spawn(move || shared.sort_thread(index)) {
            Ok(handle) => {
                self.stats.record_spawn();
                self.workers.lock().push(handle);
            }
            Err(err) => {
                // The slot stays consumed; waiting threads drain the stack.
                self.stats.record_spawn_failure();
                warn!(index, error = %err, "failed to spawn sort worker");
            }
        }
    }

    fn sort_thread(self: Arc<Self>, index: usize) {
        debug!(index, "sort worker started");
        while !self.shutdown.load(Ordering::Acquire) {
            if !self.try_sort_job() {
                thread::yield_now();
            }
        }
        self.stats.record_worker_exit();
        debug!(index, "sort worker exiting");
    }

    /// Pops one job, sorts it and resolves its result. Returns false when
    /// the stack was empty.
    fn try_sort_job(self: &Arc<Self>) -> bool {
        let Some(job) = self.stack.try_pop() else {
            return false;
        };
        let (data, depth_budget, promise) = job.into_parts();
        trace!(len = data.len(), depth_budget, "sorting popped partition");
        let result = self.sort_guarded(data, depth_budget);
        self.stats.record_completion();
        promise.fulfill(result);
        true
    }

    /// Busy-help wait: keeps draining the stack until `handle` is ready.
    fn help_until_ready(self: &Arc<Self>, mut handle: JobHandle<T>) -> JobResult<T> {
        while !handle.poll() {
            if !self.try_sort_job() {
                thread::yield_now();
            }
        }
        handle.into_result()
    }
}
