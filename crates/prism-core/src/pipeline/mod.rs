//! Pipeline orchestration: wires the stage workers together.
//!
//! ```text
//! submit -> [read queue] -> reader -> [process queue] -> processor(s)
//!        -> [write queue] -> writer -> outcomes on the owning job
//! ```
//!
//! The queues are the only coupling between stages; backpressure is emergent
//! (a slow writer stalls processors, which stall the reader, which throttles
//! submission). End-to-end FIFO holds only with a single processor worker;
//! with more, units complete in nondeterministic order and the job's outcome
//! list reflects completion order.

mod stages;

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::PipelineConfig;
use crate::error::{PrismError, Result, UnitError};
use crate::job::{JobHandle, JobInner, JobSpec, Outcome};
use crate::queue::{BoundedQueue, Closed};
use crate::stats::AppStats;
use crate::unit::WorkUnit;

/// The running pipeline: long-lived stage workers plus the stage queues.
///
/// Shutdown is close-based and drains in stage order, so no accepted unit is
/// ever lost: every submitted unit ends in an outcome, success or failure.
pub struct Pipeline {
    stats: Arc<AppStats>,
    read_queue: Arc<BoundedQueue<WorkUnit>>,
    process_queue: Arc<BoundedQueue<WorkUnit>>,
    write_queue: Arc<BoundedQueue<WorkUnit>>,
    reader: Option<JoinHandle<()>>,
    processors: Vec<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl Pipeline {
    /// Spawn the stage workers: one reader, `processor_workers` processors,
    /// one writer.
    pub fn start(config: &PipelineConfig, stats: Arc<AppStats>) -> Self {
        let capacity = config.queue_capacity.max(1);
        let read_queue = Arc::new(BoundedQueue::new(capacity));
        let process_queue = Arc::new(BoundedQueue::new(capacity));
        let write_queue = Arc::new(BoundedQueue::new(capacity));

        let reader = {
            let input = Arc::clone(&read_queue);
            let output = Arc::clone(&process_queue);
            std::thread::spawn(move || stages::reader_loop(input, output))
        };

        let processors = (0..config.processor_workers.max(1))
            .map(|_| {
                let input = Arc::clone(&process_queue);
                let output = Arc::clone(&write_queue);
                std::thread::spawn(move || stages::processor_loop(input, output))
            })
            .collect();

        let writer = {
            let input = Arc::clone(&write_queue);
            std::thread::spawn(move || stages::writer_loop(input))
        };

        tracing::info!(
            "Pipeline started: {} processor worker(s), queue capacity {}",
            config.processor_workers.max(1),
            capacity
        );

        Self {
            stats,
            read_queue,
            process_queue,
            write_queue,
            reader: Some(reader),
            processors,
            writer: Some(writer),
        }
    }

    /// Submit a job: one work unit per input path, in input order.
    ///
    /// Returns immediately with a handle; a lightweight task thread performs
    /// the (potentially blocking) submission so callers are only throttled by
    /// backpressure when they choose to wait.
    pub fn submit(&self, spec: JobSpec) -> Result<JobHandle> {
        if spec.inputs.is_empty() {
            return Err(PrismError::EmptyJob);
        }

        self.stats.record_job_started();
        let inner = Arc::new(JobInner::new(
            spec.filter.name().to_string(),
            spec.target_dir.clone(),
        ));
        let handle = JobHandle::new(Arc::clone(&inner));

        tracing::info!(
            "Submitting job: {} file(s), filter {}, target {:?}",
            spec.inputs.len(),
            spec.filter.name(),
            spec.target_dir
        );

        let read_queue = Arc::clone(&self.read_queue);
        let stats = Arc::clone(&self.stats);
        std::thread::spawn(move || {
            for input in spec.inputs {
                if inner.is_canceled() {
                    tracing::info!("Submission stopped by cancellation");
                    break;
                }
                let unit = WorkUnit::new(
                    input,
                    spec.target_dir.clone(),
                    spec.filter.clone(),
                    &inner,
                    Arc::clone(&stats),
                );
                inner.record_submitted();
                if let Err(Closed(unit)) = read_queue.put(unit) {
                    // Pipeline shut down mid-submission; account for the unit
                    // and stop, the queue will not reopen.
                    let err = UnitError::Read {
                        path: unit.input_path().clone(),
                        message: "pipeline shut down".to_string(),
                    };
                    inner.record_outcome(Outcome::failure(unit.input_path().clone(), &err));
                    break;
                }
            }
            inner.seal();
        });

        Ok(handle)
    }

    /// The shared stats aggregator.
    pub fn stats(&self) -> Arc<AppStats> {
        Arc::clone(&self.stats)
    }

    /// Close the queues in stage order and join every worker, draining all
    /// in-flight units.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        self.read_queue.close();
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        self.process_queue.close();
        for handle in self.processors.drain(..) {
            let _ = handle.join();
        }
        self.write_queue.close();
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
        tracing::info!("Pipeline shut down");
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalConfig;
    use crate::filter::Filter;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::path::{Path, PathBuf};

    fn write_test_png(dir: &Path, name: &str, color: [u8; 3]) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(6, 6, Rgb(color))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();
        path
    }

    fn pipeline(processors: usize) -> Pipeline {
        let config = PipelineConfig {
            queue_capacity: 4,
            processor_workers: processors,
        };
        Pipeline::start(&config, Arc::new(AppStats::new()))
    }

    #[test]
    fn test_invert_batch_end_to_end() {
        let input_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..3)
            .map(|i| write_test_png(input_dir.path(), &format!("img{i}.png"), [10, 20, 30]))
            .collect();

        let pipeline = pipeline(1);
        let handle = pipeline
            .submit(JobSpec {
                inputs: inputs.clone(),
                target_dir: target_dir.path().to_path_buf(),
                filter: Filter::Invert,
            })
            .unwrap();
        let report = handle.wait();

        assert_eq!(report.submitted, 3);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed, 0);
        assert!(!report.canceled);
        assert_eq!(report.outcomes.len(), 3);
        for i in 0..3 {
            assert!(target_dir.path().join(format!("Invert_img{i}.png")).is_file());
        }

        let snap = pipeline.stats().snapshot();
        assert_eq!(snap.jobs_started, 1);
        assert_eq!(snap.units_succeeded, 3);
        pipeline.shutdown();
    }

    #[test]
    fn test_single_processor_preserves_input_order() {
        let input_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..6)
            .map(|i| write_test_png(input_dir.path(), &format!("f{i}.png"), [i as u8, 0, 0]))
            .collect();

        let pipeline = pipeline(1);
        let report = pipeline
            .submit(JobSpec {
                inputs: inputs.clone(),
                target_dir: target_dir.path().to_path_buf(),
                filter: Filter::Solarize,
            })
            .unwrap()
            .wait();

        let completed: Vec<PathBuf> = report.outcomes.iter().map(|o| o.input_path.clone()).collect();
        assert_eq!(completed, inputs);
    }

    #[test]
    fn test_outcome_count_independent_of_processor_workers() {
        for processors in [1, 4] {
            let input_dir = tempfile::tempdir().unwrap();
            let target_dir = tempfile::tempdir().unwrap();
            let inputs: Vec<PathBuf> = (0..12)
                .map(|i| write_test_png(input_dir.path(), &format!("n{i}.png"), [50, 60, 70]))
                .collect();

            let pipeline = pipeline(processors);
            let report = pipeline
                .submit(JobSpec {
                    inputs,
                    target_dir: target_dir.path().to_path_buf(),
                    filter: Filter::Median,
                })
                .unwrap()
                .wait();

            assert_eq!(report.outcomes.len(), 12, "processors={processors}");
            assert_eq!(report.succeeded, 12, "processors={processors}");
        }
    }

    #[test]
    fn test_missing_file_yields_read_failure_and_job_completes() {
        let input_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let good = write_test_png(input_dir.path(), "good.png", [1, 2, 3]);
        let missing = input_dir.path().join("missing.png");

        let pipeline = pipeline(2);
        let report = pipeline
            .submit(JobSpec {
                inputs: vec![good.clone(), missing.clone()],
                target_dir: target_dir.path().to_path_buf(),
                filter: Filter::Invert,
            })
            .unwrap()
            .wait();

        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        let failure = report.outcomes.iter().find(|o| !o.success).unwrap();
        assert_eq!(failure.input_path, missing);
        assert!(failure.error.as_deref().unwrap().contains("Read error"));
    }

    #[test]
    fn test_external_failure_is_recoverable() {
        let input_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let inputs = vec![
            write_test_png(input_dir.path(), "a.png", [9, 9, 9]),
            write_test_png(input_dir.path(), "b.png", [8, 8, 8]),
        ];

        let external = ExternalConfig {
            dp_edge: "false".to_string(),
            ..ExternalConfig::default()
        };
        let filter = Filter::parse("DPEdge", 2, &external).unwrap();

        let pipeline = pipeline(1);
        let report = pipeline
            .submit(JobSpec {
                inputs,
                target_dir: target_dir.path().to_path_buf(),
                filter,
            })
            .unwrap()
            .wait();

        assert_eq!(report.failed, 2);
        for outcome in &report.outcomes {
            assert!(outcome.error.as_deref().unwrap().contains("Process error"));
        }

        // The pipeline survives the failed external invocations.
        let ok = write_test_png(input_dir.path(), "after.png", [4, 5, 6]);
        let report = pipeline
            .submit(JobSpec {
                inputs: vec![ok],
                target_dir: target_dir.path().to_path_buf(),
                filter: Filter::Invert,
            })
            .unwrap()
            .wait();
        assert_eq!(report.succeeded, 1);
    }

    #[test]
    fn test_cancel_accounts_for_every_submitted_unit() {
        let input_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let inputs: Vec<PathBuf> = (0..40)
            .map(|i| write_test_png(input_dir.path(), &format!("c{i}.png"), [3, 3, 3]))
            .collect();

        let pipeline = pipeline(1);
        let handle = pipeline
            .submit(JobSpec {
                inputs,
                target_dir: target_dir.path().to_path_buf(),
                filter: Filter::Oil4,
            })
            .unwrap();
        handle.cancel();

        let report = handle.wait();
        assert!(report.canceled);
        // Whatever was submitted before the flag was observed is accounted for.
        assert_eq!(report.outcomes.len(), report.submitted);
    }

    #[test]
    fn test_empty_job_is_rejected() {
        let pipeline = pipeline(1);
        let err = pipeline
            .submit(JobSpec {
                inputs: vec![],
                target_dir: PathBuf::from("/tmp"),
                filter: Filter::Invert,
            })
            .unwrap_err();
        assert!(matches!(err, PrismError::EmptyJob));
    }

    #[test]
    fn test_submit_after_shutdown_fails_units_cleanly() {
        let input_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        let input = write_test_png(input_dir.path(), "late.png", [7, 7, 7]);

        let stats = Arc::new(AppStats::new());
        let config = PipelineConfig::default();
        let pipeline = Pipeline::start(&config, Arc::clone(&stats));

        // Keep a queue reference alive past shutdown via a submitted-later job.
        let read_queue = Arc::clone(&pipeline.read_queue);
        pipeline.shutdown();
        assert!(read_queue.is_empty());

        // A fresh pipeline would be the normal path; submitting to a shut-down
        // one must still terminate the job rather than hang.
        let pipeline = Pipeline::start(&config, stats);
        pipeline.read_queue.close();
        let report = pipeline
            .submit(JobSpec {
                inputs: vec![input],
                target_dir: target_dir.path().to_path_buf(),
                filter: Filter::Invert,
            })
            .unwrap()
            .wait();
        assert_eq!(report.failed, 1);
        assert!(report.outcomes[0]
            .error
            .as_deref()
            .unwrap()
            .contains("pipeline shut down"));
    }
}
