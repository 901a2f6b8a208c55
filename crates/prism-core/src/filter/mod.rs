//! The filter catalog.
//!
//! Filters form a closed set of variants behind one `apply` capability. Five
//! run in-process against decoded pixel buffers; three delegate to external
//! executables and never touch pixels here. Each variant owns its own
//! configuration (worker count for the data-parallel median, program name for
//! external filters).

mod external;
mod median;
mod oil;
mod parallel;
mod point;

pub use external::ExternalFilter;
pub use oil::OIL_RADIUS;
pub use parallel::median_parallel;

use image::RgbImage;

use crate::config::ExternalConfig;
use crate::error::ConfigError;

/// Catalog names, in display order. The first five are in-process.
pub const CATALOG: [&str; 8] = [
    "Invert", "Solarize", "Oil4", "Median", "DPMedian", "DPEdge", "DPFunk1", "DPFunk2",
];

/// A selected filter and its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Per-channel inversion
    Invert,
    /// Per-channel fold about the midpoint
    Solarize,
    /// Oil-painting stylization at a fixed radius of 4
    Oil4,
    /// Sequential 3x3 clamped median
    Median,
    /// Row-partitioned data-parallel median
    DpMedian { workers: usize },
    /// Out-of-process filter invocation
    External(ExternalFilter),
}

impl Filter {
    /// Resolve a catalog name to a filter.
    ///
    /// `workers` configures the data-parallel variants (floored at 1, ignored
    /// by the others); external program names come from `external`.
    pub fn parse(name: &str, workers: usize, external: &ExternalConfig) -> Result<Self, ConfigError> {
        let workers = workers.max(1);
        match name {
            "Invert" => Ok(Filter::Invert),
            "Solarize" => Ok(Filter::Solarize),
            "Oil4" => Ok(Filter::Oil4),
            "Median" => Ok(Filter::Median),
            "DPMedian" => Ok(Filter::DpMedian { workers }),
            "DPEdge" => Ok(Filter::External(ExternalFilter::new(
                name,
                external.dp_edge.clone(),
                external.wrapper.clone(),
                workers,
            ))),
            "DPFunk1" => Ok(Filter::External(ExternalFilter::new(
                name,
                external.dp_funk1.clone(),
                external.wrapper.clone(),
                workers,
            ))),
            "DPFunk2" => Ok(Filter::External(ExternalFilter::new(
                name,
                external.dp_funk2.clone(),
                external.wrapper.clone(),
                workers,
            ))),
            other => Err(ConfigError::UnknownFilter(other.to_string())),
        }
    }

    /// The catalog name, used for output file naming and stats keys.
    pub fn name(&self) -> &str {
        match self {
            Filter::Invert => "Invert",
            Filter::Solarize => "Solarize",
            Filter::Oil4 => "Oil4",
            Filter::Median => "Median",
            Filter::DpMedian { .. } => "DPMedian",
            Filter::External(ext) => ext.name(),
        }
    }

    /// Whether this filter runs out-of-process.
    pub fn is_external(&self) -> bool {
        matches!(self, Filter::External(_))
    }

    /// Apply an in-process filter, producing a fresh output image.
    ///
    /// # Panics
    ///
    /// Panics if called on an `External` variant; external units are
    /// dispatched through [`ExternalFilter::run`] before pixels are involved.
    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        match self {
            Filter::Invert => point::invert(image),
            Filter::Solarize => point::solarize(image),
            Filter::Oil4 => oil::oil(image, OIL_RADIUS),
            Filter::Median => median::median(image),
            Filter::DpMedian { workers } => parallel::median_parallel(image, *workers),
            Filter::External(ext) => {
                unreachable!("external filter {} has no in-process apply", ext.name())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_catalog() {
        let external = ExternalConfig::default();
        for name in CATALOG {
            let filter = Filter::parse(name, 2, &external).unwrap();
            assert_eq!(filter.name(), name);
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        let err = Filter::parse("Sharpen", 1, &ExternalConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownFilter(_)));
        assert!(err.to_string().contains("Sharpen"));
    }

    #[test]
    fn test_external_split() {
        let external = ExternalConfig::default();
        for name in CATALOG {
            let filter = Filter::parse(name, 1, &external).unwrap();
            let expected = matches!(name, "DPEdge" | "DPFunk1" | "DPFunk2");
            assert_eq!(filter.is_external(), expected, "{name}");
        }
    }

    #[test]
    fn test_dp_median_workers_floored() {
        let filter = Filter::parse("DPMedian", 0, &ExternalConfig::default()).unwrap();
        assert_eq!(filter, Filter::DpMedian { workers: 1 });
    }

    #[test]
    fn test_external_uses_configured_program() {
        let mut external = ExternalConfig::default();
        external.dp_edge = "/opt/filters/edge".to_string();
        external.wrapper = vec!["docker".to_string(), "run".to_string()];
        let filter = Filter::parse("DPEdge", 4, &external).unwrap();
        match filter {
            Filter::External(ext) => {
                assert_eq!(ext.name(), "DPEdge");
                assert_eq!(ext.workers(), 4);
            }
            other => panic!("expected external filter, got {other:?}"),
        }
    }
}
