use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters collected over the lifetime of one engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SortStats {
    /// Lower partitions pushed onto the work stack.
    pub jobs_pushed: usize,
    /// Pushed partitions that were popped, sorted and resolved.
    pub jobs_completed: usize,
    pub workers_spawned: usize,
    pub spawn_failures: usize,
    /// Highest number of worker threads alive at the same time.
    pub peak_live_workers: usize,
    /// Workers still running when the snapshot was taken.
    pub live_workers: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    jobs_pushed: AtomicUsize,
    jobs_completed: AtomicUsize,
    workers_spawned: AtomicUsize,
    spawn_failures: AtomicUsize,
    live_workers: AtomicUsize,
    peak_live_workers: AtomicUsize,
}

impl StatsCounters {
    pub(crate) fn record_push(&self) {
        self.jobs_pushed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completion(&self) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts a worker as live before its thread is started, so the exit
    /// decrement can never run first.
    pub(crate) fn record_worker_starting(&self) {
        let live = self.live_workers.fetch_add(1, Ordering::AcqRel) + 1;
        self.peak_live_workers.fetch_max(live, Ordering::AcqRel);
    }

    pub(crate) fn record_spawn(&self) {
        self.workers_spawned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_spawn_failure(&self) {
        self.spawn_failures.fetch_add(1, Ordering::Relaxed);
        self.live_workers.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn record_worker_exit(&self) {
        self.live_workers.fetch_sub(1, Ordering::AcqRel);
    }

    pub(crate) fn snapshot(&self) -> SortStats {
        SortStats {
            jobs_pushed: self.jobs_pushed.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            workers_spawned: self.workers_spawned.load(Ordering::Relaxed),
            spawn_failures: self.spawn_failures.load(Ordering::Relaxed),
            peak_live_workers: self.peak_live_workers.load(Ordering::Acquire),
            live_workers: self.live_workers.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_tracks_highest_concurrent_count() {
        let counters = StatsCounters::default();
        counters.record_worker_starting();
        counters.record_spawn();
        counters.record_worker_starting();
        counters.record_spawn();
        counters.record_worker_exit();
        counters.record_worker_starting();
        counters.record_spawn_failure();

        let stats = counters.snapshot();
        assert_eq!(stats.workers_spawned, 2);
        assert_eq!(stats.spawn_failures, 1);
        assert_eq!(stats.peak_live_workers, 2);
        assert_eq!(stats.live_workers, 1);
    }

    #[test]
    fn job_counters() {
        let counters = StatsCounters::default();
        for _ in 0..3 {
            counters.record_push();
        }
        counters.record_completion();

        let stats = counters.snapshot();
        assert_eq!(stats.jobs_pushed, 3);
        assert_eq!(stats.jobs_completed, 1);
        assert_eq!(SortStats::default().jobs_pushed, 0);
    }
}
