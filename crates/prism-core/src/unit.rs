//! One input-to-output file task flowing through the pipeline.
//!
//! A unit's pixel buffer exists only between a successful read and the write;
//! exactly one stage owns the unit (and therefore the buffer) at any time,
//! with ownership handed over at the queue boundary. The back-reference to
//! the owning job is weak: units report progress, they never keep a job alive.

use std::path::PathBuf;
use std::sync::{Arc, Weak};
use std::time::Instant;

use image::{ImageFormat, RgbImage};

use crate::error::UnitError;
use crate::filter::Filter;
use crate::job::JobInner;
use crate::stats::AppStats;

/// Processing state; exactly one variant holds at any time.
///
/// The inner image is `None` for external-filter units, which never hold
/// pixels in-process (the external executable does its own file I/O).
enum UnitState {
    Unread,
    Read(Option<RgbImage>),
    Processed(Option<RgbImage>),
    Written,
}

/// One file task: input path, destination, filter, and per-unit timing.
pub struct WorkUnit {
    input_path: PathBuf,
    target_dir: PathBuf,
    filter: Filter,
    job: Weak<JobInner>,
    stats: Arc<AppStats>,
    file_bytes: u64,
    read_started: Option<Instant>,
    state: UnitState,
}

impl WorkUnit {
    /// Create a unit for one input file. The byte size is captured here, at
    /// submission time.
    pub fn new(
        input_path: PathBuf,
        target_dir: PathBuf,
        filter: Filter,
        job: &Arc<JobInner>,
        stats: Arc<AppStats>,
    ) -> Self {
        let file_bytes = std::fs::metadata(&input_path).map(|m| m.len()).unwrap_or(0);
        Self {
            input_path,
            target_dir,
            filter,
            job: Arc::downgrade(job),
            stats,
            file_bytes,
            read_started: None,
            state: UnitState::Unread,
        }
    }

    /// Load and decode the input file.
    ///
    /// External-filter units only stamp the read timestamp and check the file
    /// exists; the executable reads the file itself.
    pub fn read(&mut self) -> Result<(), UnitError> {
        self.read_started = Some(Instant::now());
        tracing::info!(
            "Applying {} to {:?}",
            self.filter.name(),
            self.input_path
        );

        if self.filter.is_external() {
            if !self.input_path.is_file() {
                return Err(UnitError::Read {
                    path: self.input_path.clone(),
                    message: "no such file".to_string(),
                });
            }
            self.state = UnitState::Read(None);
            return Ok(());
        }

        // Detect the format from content, not the extension, so misnamed
        // files still decode.
        let image = image::ImageReader::open(&self.input_path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| UnitError::Read {
                path: self.input_path.clone(),
                message: e.to_string(),
            })?
            .decode()
            .map_err(|e| UnitError::Read {
                path: self.input_path.clone(),
                message: e.to_string(),
            })?
            .to_rgb8();
        self.state = UnitState::Read(Some(image));
        Ok(())
    }

    /// Apply the unit's filter: in-process against the decoded buffer, or by
    /// invoking the external executable.
    pub fn process(&mut self) -> Result<(), UnitError> {
        match std::mem::replace(&mut self.state, UnitState::Unread) {
            UnitState::Read(Some(image)) => {
                let output = self.filter.apply(&image);
                self.state = UnitState::Processed(Some(output));
            }
            UnitState::Read(None) => {
                if let Filter::External(ext) = &self.filter {
                    ext.run(&self.input_path, &self.output_path())?;
                }
                self.state = UnitState::Processed(None);
            }
            _ => {
                return Err(UnitError::Process {
                    path: self.input_path.clone(),
                    message: "unit was not read".to_string(),
                })
            }
        }
        self.stats.record_unit_processed();
        Ok(())
    }

    /// Persist the output and release the pixel buffer.
    ///
    /// Output goes to `<target_dir>/<filter>_<file_name>`, always JPEG,
    /// overwriting any existing file. External units skip encoding (their
    /// executable already wrote the output) and only settle the accounting.
    pub fn write(&mut self) -> Result<PathBuf, UnitError> {
        let output = self.output_path();
        match std::mem::replace(&mut self.state, UnitState::Written) {
            UnitState::Processed(Some(image)) => {
                image
                    .save_with_format(&output, ImageFormat::Jpeg)
                    .map_err(|e| UnitError::Write {
                        path: output.clone(),
                        message: e.to_string(),
                    })?;
            }
            UnitState::Processed(None) => {}
            _ => {
                return Err(UnitError::Write {
                    path: output,
                    message: "unit was not processed".to_string(),
                })
            }
        }

        self.stats.record_unit_succeeded();
        let millis = self
            .read_started
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        self.stats.record_filter(self.filter.name(), self.file_bytes, millis);
        Ok(output)
    }

    /// Output file path: `<target_dir>/<filter>_<file_name>`.
    pub fn output_path(&self) -> PathBuf {
        let name = self
            .input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input_path.to_string_lossy().into_owned());
        self.target_dir.join(format!("{}_{}", self.filter.name(), name))
    }

    pub fn input_path(&self) -> &PathBuf {
        &self.input_path
    }

    pub fn file_bytes(&self) -> u64 {
        self.file_bytes
    }

    /// Upgrade the weak job reference; `None` if the job was dropped.
    pub fn job(&self) -> Option<Arc<JobInner>> {
        self.job.upgrade()
    }
}
