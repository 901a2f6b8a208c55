//! Sub-configuration structs with pipeline defaults.

use serde::{Deserialize, Serialize};

/// Pipeline settings: queue sizing and stage worker counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capacity of each bounded queue between stages
    pub queue_capacity: usize,

    /// Number of concurrent processor stage workers
    pub processor_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: crate::queue::DEFAULT_CAPACITY,
            processor_workers: 1,
        }
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Default worker count for data-parallel filters
    pub dp_workers: usize,

    /// Supported input formats (extension whitelist for directory expansion)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            dp_workers: 1,
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
            ],
        }
    }
}

/// External filter settings.
///
/// The three `DP*` external filters shell out to standalone executables. The
/// `wrapper` prefix lets the executables run inside a container runtime
/// (e.g. `["docker", "run", "--rm", "imgfilters"]`); the default is direct
/// invocation from `PATH`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalConfig {
    /// Command prefix prepended to every external filter invocation
    pub wrapper: Vec<String>,

    /// Executable for the DPEdge filter
    pub dp_edge: String,

    /// Executable for the DPFunk1 filter
    pub dp_funk1: String,

    /// Executable for the DPFunk2 filter
    pub dp_funk2: String,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            wrapper: vec![],
            dp_edge: "jpegedge".to_string(),
            dp_funk1: "jpegfunk1".to_string(),
            dp_funk2: "jpegfunk2".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,

    /// Log format: "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}
