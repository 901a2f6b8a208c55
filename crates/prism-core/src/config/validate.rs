//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.pipeline.queue_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.queue_capacity must be > 0".into(),
            ));
        }
        if self.pipeline.processor_workers == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.processor_workers must be > 0".into(),
            ));
        }
        if self.processing.dp_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.dp_workers must be > 0".into(),
            ));
        }
        if self.external.dp_edge.is_empty()
            || self.external.dp_funk1.is_empty()
            || self.external.dp_funk2.is_empty()
        {
            return Err(ConfigError::ValidationError(
                "external filter executables must not be empty".into(),
            ));
        }
        Ok(())
    }
}
