mod config;
mod engine;
mod error;
mod job;
mod sequential;
mod stack;
mod stats;

use std::cmp::Ordering;

pub use config::{SortConfig, TUNED_CONFIG, default_max_worker_count};
pub use engine::SortEngine;
pub use error::SortError;
pub use stack::WorkStack;
pub use stats::SortStats;

/// Sorts `data` in ascending order on a work-stealing pool sized to the
/// machine. All worker threads are joined before this returns.
pub fn parallel_sort<T>(data: Vec<T>) -> Result<Vec<T>, SortError>
where
    T: Ord + Send + 'static,
{
    parallel_sort_by(data, T::cmp)
}

pub fn parallel_sort_by<T, F>(data: Vec<T>, compare: F) -> Result<Vec<T>, SortError>
where
    T: Send + 'static,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    parallel_sort_with_config(data, compare, &SortConfig::default())
}

pub fn parallel_sort_with_config<T, F>(
    data: Vec<T>,
    compare: F,
    config: &SortConfig,
) -> Result<Vec<T>, SortError>
where
    T: Send + 'static,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    parallel_sort_with_stats(data, compare, config).map(|(sorted, _)| sorted)
}

/// Like [`parallel_sort_with_config`], also returning the engine counters.
///
/// An empty input returns immediately without building an engine. On
/// failure no partial result is returned.
pub fn parallel_sort_with_stats<T, F>(
    data: Vec<T>,
    compare: F,
    config: &SortConfig,
) -> Result<(Vec<T>, SortStats), SortError>
where
    T: Send + 'static,
    F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
{
    if data.is_empty() {
        return Ok((data, SortStats::default()));
    }

    let engine = SortEngine::with_config(compare, *config);
    let sorted = engine.sort(data);
    let stats = engine.shutdown();
    sorted.map(|sorted| (sorted, stats))
}
