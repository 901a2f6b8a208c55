//! Process-wide counters and per-filter throughput accounting.
//!
//! One `AppStats` aggregator is shared by every stage thread. Counters only
//! ever increase during a run, so readers may observe slightly stale values;
//! external code only sees read-only snapshots.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;

const BYTES_PER_MB: f64 = 1_048_576.0;

/// Cumulative bytes and wall-clock milliseconds for one filter.
#[derive(Debug, Default, Clone, Copy)]
struct FilterStat {
    bytes: u64,
    millis: u64,
}

/// Global pipeline statistics, mutated from every stage thread.
#[derive(Default)]
pub struct AppStats {
    /// Jobs submitted to the pipeline.
    jobs_started: AtomicU64,
    /// Units whose filter application completed (in-process or external).
    units_processed: AtomicU64,
    /// Units whose output was written out, across all jobs.
    units_succeeded: AtomicU64,
    filters: Mutex<HashMap<String, FilterStat>>,
}

impl AppStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_job_started(&self) {
        self.jobs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unit_processed(&self) {
        self.units_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unit_succeeded(&self) {
        self.units_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    /// Attribute `bytes` of input and `millis` of read-to-write latency to a
    /// filter, keyed by its catalog name.
    pub fn record_filter(&self, filter_name: &str, bytes: u64, millis: u64) {
        let mut filters = self.filters.lock().unwrap_or_else(|e| e.into_inner());
        let stat = filters.entry(filter_name.to_string()).or_default();
        stat.bytes += bytes;
        stat.millis += millis;
    }

    /// Take a read-only snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        let filters = self.filters.lock().unwrap_or_else(|e| e.into_inner());
        let mut per_filter: Vec<FilterSnapshot> = filters
            .iter()
            .map(|(name, stat)| FilterSnapshot {
                filter: name.clone(),
                bytes: stat.bytes,
                millis: stat.millis,
                throughput_mb_per_sec: throughput(stat.bytes, stat.millis),
            })
            .collect();
        per_filter.sort_by(|a, b| a.filter.cmp(&b.filter));

        StatsSnapshot {
            jobs_started: self.jobs_started.load(Ordering::Relaxed),
            units_processed: self.units_processed.load(Ordering::Relaxed),
            units_succeeded: self.units_succeeded.load(Ordering::Relaxed),
            filters: per_filter,
        }
    }
}

fn throughput(bytes: u64, millis: u64) -> f64 {
    if millis == 0 {
        return 0.0;
    }
    (bytes as f64 / BYTES_PER_MB) / (millis as f64 / 1000.0)
}

/// Point-in-time view of `AppStats`, safe to hand outward.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub jobs_started: u64,
    pub units_processed: u64,
    pub units_succeeded: u64,
    pub filters: Vec<FilterSnapshot>,
}

/// Per-filter slice of a snapshot, with derived MB/s throughput.
#[derive(Debug, Clone, Serialize)]
pub struct FilterSnapshot {
    pub filter: String,
    pub bytes: u64,
    pub millis: u64,
    pub throughput_mb_per_sec: f64,
}
