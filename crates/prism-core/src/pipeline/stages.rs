//! Stage worker loops: read, process, write.
//!
//! Every stage runs the same shape of loop: dequeue a unit, do the stage
//! work, attribute the elapsed time to the owning job, forward the unit.
//! A per-unit failure becomes a failure outcome on the job and the unit is
//! dropped; the stage thread itself keeps serving the queue until its input
//! queue closes and drains.

use std::sync::Arc;
use std::time::Instant;

use crate::error::UnitError;
use crate::job::Outcome;
use crate::queue::{BoundedQueue, Closed};
use crate::unit::WorkUnit;

pub(super) fn reader_loop(
    input: Arc<BoundedQueue<WorkUnit>>,
    output: Arc<BoundedQueue<WorkUnit>>,
) {
    while let Some(mut unit) = input.get() {
        let start = Instant::now();
        let result = unit.read();
        if let Some(job) = unit.job() {
            job.add_read_millis(start.elapsed().as_millis() as u64);
        }
        match result {
            Ok(()) => forward(unit, &output),
            Err(e) => record_failure(unit, &e),
        }
    }
    tracing::debug!("Reader stage exiting");
}

pub(super) fn processor_loop(
    input: Arc<BoundedQueue<WorkUnit>>,
    output: Arc<BoundedQueue<WorkUnit>>,
) {
    while let Some(mut unit) = input.get() {
        let start = Instant::now();
        let result = unit.process();
        if let Some(job) = unit.job() {
            job.add_process_millis(start.elapsed().as_millis() as u64);
        }
        match result {
            Ok(()) => forward(unit, &output),
            Err(e) => record_failure(unit, &e),
        }
    }
    tracing::debug!("Processor stage exiting");
}

pub(super) fn writer_loop(input: Arc<BoundedQueue<WorkUnit>>) {
    while let Some(mut unit) = input.get() {
        let start = Instant::now();
        let result = unit.write();
        if let Some(job) = unit.job() {
            job.add_write_millis(start.elapsed().as_millis() as u64);
        }
        match result {
            Ok(output_path) => {
                tracing::debug!("Wrote {:?}", output_path);
                if let Some(job) = unit.job() {
                    job.record_outcome(Outcome::success(unit.input_path().clone(), output_path));
                }
            }
            Err(e) => record_failure(unit, &e),
        }
    }
    tracing::debug!("Writer stage exiting");
}

/// Hand the unit to the next stage. If that queue closed mid-flight the unit
/// comes back; account for it so its job still terminates.
fn forward(unit: WorkUnit, next: &BoundedQueue<WorkUnit>) {
    if let Err(Closed(unit)) = next.put(unit) {
        let err = UnitError::Process {
            path: unit.input_path().clone(),
            message: "pipeline shut down before the unit finished".to_string(),
        };
        record_failure(unit, &err);
    }
}

fn record_failure(unit: WorkUnit, err: &UnitError) {
    tracing::warn!("Unit failed in {} stage: {}", err.stage(), err);
    if let Some(job) = unit.job() {
        job.record_outcome(Outcome::failure(unit.input_path().clone(), err));
    }
}
