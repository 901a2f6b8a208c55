//! Prism Core - Embeddable batch image filtering pipeline.
//!
//! Prism pushes batches of image files through a three-stage pipeline
//! (read, process, write) connected by bounded blocking queues, applying a
//! selected filter to every file and writing JPEG output.
//!
//! # Architecture
//!
//! ```text
//! Job -> [read queue] -> Reader -> [process queue] -> Processor(s)
//!     -> [write queue] -> Writer -> outcomes + completion signal
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism_core::{AppStats, Config, Filter, JobSpec, Pipeline};
//! use std::sync::Arc;
//!
//! let config = Config::load()?;
//! let pipeline = Pipeline::start(&config.pipeline, Arc::new(AppStats::new()));
//!
//! let filter = Filter::parse("Invert", 1, &config.external)?;
//! let handle = pipeline.submit(JobSpec {
//!     inputs: vec!["./beach.jpg".into()],
//!     target_dir: "./out".into(),
//!     filter,
//! })?;
//! let report = handle.wait();
//! println!("{} of {} succeeded", report.succeeded, report.submitted);
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod filter;
pub mod job;
pub mod pipeline;
pub mod queue;
pub mod stats;
pub mod unit;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PrismError, Result, UnitError};
pub use filter::{ExternalFilter, Filter, CATALOG};
pub use job::{JobHandle, JobReport, JobSpec, Outcome};
pub use pipeline::Pipeline;
pub use queue::BoundedQueue;
pub use stats::{AppStats, StatsSnapshot};
pub use unit::WorkUnit;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
