//! Job lifecycle: a submitted batch of work units and its completion signal.
//!
//! A job is a plain value plus a handle; the pipeline runs its submission on a
//! lightweight task thread. Completion is a counting signal: the job is done
//! exactly when submission has finished ("sealed") and every submitted unit
//! has an outcome, success or failure. The condition is always re-checked
//! under the lock, so a unit finishing before the caller starts waiting can
//! never be missed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use serde::Serialize;

use crate::error::UnitError;
use crate::filter::Filter;

/// A batch submission: which files, where to, and through which filter.
#[derive(Debug, Clone)]
pub struct JobSpec {
    /// Ordered input file paths; submission preserves this order
    pub inputs: Vec<PathBuf>,
    /// Directory receiving the output files
    pub target_dir: PathBuf,
    /// Filter applied to every input
    pub filter: Filter,
}

/// Per-unit result, appended to the job in completion order.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub input_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub fn success(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            success: true,
            input_path,
            output_path: Some(output_path),
            error: None,
        }
    }

    pub fn failure(input_path: PathBuf, error: &UnitError) -> Self {
        Self {
            success: false,
            input_path,
            output_path: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct Progress {
    outcomes: Vec<Outcome>,
    submitted: usize,
    sealed: bool,
    done: bool,
}

impl Progress {
    fn check_done(&mut self) -> bool {
        if self.sealed && self.outcomes.len() >= self.submitted {
            self.done = true;
        }
        self.done
    }
}

/// Shared job state; stages hold only `Weak` references to it through their
/// work units.
#[derive(Debug)]
pub struct JobInner {
    filter_name: String,
    target_dir: PathBuf,
    started: Instant,
    progress: Mutex<Progress>,
    done_cv: Condvar,
    canceled: AtomicBool,
    total_millis: AtomicU64,
    read_millis: AtomicU64,
    process_millis: AtomicU64,
    write_millis: AtomicU64,
}

impl JobInner {
    pub(crate) fn new(filter_name: String, target_dir: PathBuf) -> Self {
        Self {
            filter_name,
            target_dir,
            started: Instant::now(),
            progress: Mutex::new(Progress::default()),
            done_cv: Condvar::new(),
            canceled: AtomicBool::new(false),
            total_millis: AtomicU64::new(0),
            read_millis: AtomicU64::new(0),
            process_millis: AtomicU64::new(0),
            write_millis: AtomicU64::new(0),
        }
    }

    /// Count one unit as submitted. Called before the unit enters the read
    /// queue, so a fast writer can never outrun the count.
    pub(crate) fn record_submitted(&self) {
        let mut progress = self.lock();
        progress.submitted += 1;
    }

    /// Mark submission finished; the job becomes done once outcomes catch up
    /// (immediately, for an empty or fully-canceled submission).
    pub(crate) fn seal(&self) {
        let mut progress = self.lock();
        progress.sealed = true;
        if progress.check_done() {
            self.total_millis
                .store(self.started.elapsed().as_millis() as u64, Ordering::Relaxed);
            self.done_cv.notify_all();
        }
    }

    /// Append an outcome and fire the completion signal on the last one.
    pub(crate) fn record_outcome(&self, outcome: Outcome) {
        let mut progress = self.lock();
        progress.outcomes.push(outcome);
        if progress.check_done() {
            self.total_millis
                .store(self.started.elapsed().as_millis() as u64, Ordering::Relaxed);
            self.done_cv.notify_all();
        }
    }

    pub(crate) fn add_read_millis(&self, millis: u64) {
        self.read_millis.fetch_add(millis, Ordering::Relaxed);
    }

    pub(crate) fn add_process_millis(&self, millis: u64) {
        self.process_millis.fetch_add(millis, Ordering::Relaxed);
    }

    pub(crate) fn add_write_millis(&self, millis: u64) {
        self.write_millis.fetch_add(millis, Ordering::Relaxed);
    }

    fn cancel(&self) {
        self.canceled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait(&self) {
        let mut progress = self.lock();
        while !progress.done {
            progress = self
                .done_cv
                .wait(progress)
                .unwrap_or_else(|e| e.into_inner());
        }
    }

    fn report(&self) -> JobReport {
        let progress = self.lock();
        let succeeded = progress.outcomes.iter().filter(|o| o.success).count();
        JobReport {
            filter: self.filter_name.clone(),
            target_dir: self.target_dir.clone(),
            submitted: progress.submitted,
            succeeded,
            failed: progress.outcomes.len() - succeeded,
            canceled: self.is_canceled(),
            read_millis: self.read_millis.load(Ordering::Relaxed),
            process_millis: self.process_millis.load(Ordering::Relaxed),
            write_millis: self.write_millis.load(Ordering::Relaxed),
            total_millis: self.total_millis.load(Ordering::Relaxed),
            outcomes: progress.outcomes.clone(),
        }
    }
}

/// Caller-side handle to a submitted job.
#[derive(Debug)]
pub struct JobHandle {
    inner: Arc<JobInner>,
}

impl JobHandle {
    pub(crate) fn new(inner: Arc<JobInner>) -> Self {
        Self { inner }
    }

    /// Block until every submitted unit has an outcome, then return the
    /// terminal report. The report's outcome list is in completion order,
    /// which differs from input order when multiple processors run.
    pub fn wait(self) -> JobReport {
        self.inner.wait();
        self.inner.report()
    }

    /// Request cooperative cancellation: no further units are submitted, but
    /// in-flight units drain normally. The final report is marked canceled.
    pub fn cancel(&self) {
        self.inner.cancel();
        tracing::info!("Job canceled (filter {})", self.inner.filter_name);
    }

    /// Whether the job has reached its terminal state.
    pub fn is_done(&self) -> bool {
        self.inner.lock().done
    }

    /// (completed, submitted) counts, for progress display.
    pub fn progress(&self) -> (usize, usize) {
        let progress = self.inner.lock();
        (progress.outcomes.len(), progress.submitted)
    }
}

/// Terminal job report: all outcomes plus cumulative per-stage times.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub filter: String,
    pub target_dir: PathBuf,
    pub submitted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub canceled: bool,
    pub read_millis: u64,
    pub process_millis: u64,
    pub write_millis: u64,
    pub total_millis: u64,
    pub outcomes: Vec<Outcome>,
}
