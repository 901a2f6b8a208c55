//! Adapter for out-of-process filters.
//!
//! The three `DP*` catalog filters are standalone executables. The contract
//! is exactly three arguments: absolute input path, absolute output path, and
//! a positive worker count; success means the executable wrote the output
//! file, failure is a non-zero exit status. A failed invocation is a
//! recoverable per-unit error, never fatal to the process.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::UnitError;

/// One external filter invocation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalFilter {
    name: String,
    program: String,
    wrapper: Vec<String>,
    workers: usize,
}

impl ExternalFilter {
    /// Build an external filter.
    ///
    /// `wrapper` is an optional command prefix (e.g. a container runtime
    /// invocation); when empty, `program` is executed directly.
    pub fn new(name: impl Into<String>, program: impl Into<String>, wrapper: Vec<String>, workers: usize) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            wrapper,
            workers: workers.max(1),
        }
    }

    /// Catalog name of this filter (used for output naming and stats).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Worker count passed to the executable.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run the executable against one input file.
    ///
    /// Blocks until the process exits. Stdout/stderr are inherited so filter
    /// diagnostics land in our own stderr stream.
    pub fn run(&self, input: &Path, output: &Path) -> Result<(), UnitError> {
        let input_abs = absolute(input);
        let output_abs = absolute(output);

        let mut cmd = match self.wrapper.split_first() {
            Some((head, rest)) => {
                let mut cmd = Command::new(head);
                cmd.args(rest);
                cmd.arg(&self.program);
                cmd
            }
            None => Command::new(&self.program),
        };
        cmd.arg(&input_abs)
            .arg(&output_abs)
            .arg(self.workers.to_string());

        tracing::debug!("Running external filter {}: {:?}", self.name, cmd);

        let status = cmd.status().map_err(|e| UnitError::Process {
            path: input.to_path_buf(),
            message: format!("failed to launch {}: {}", self.program, e),
        })?;

        if !status.success() {
            return Err(UnitError::Process {
                path: input.to_path_buf(),
                message: format!("{} exited with {}", self.program, status),
            });
        }
        Ok(())
    }
}

/// Best-effort absolutization; external programs get unambiguous paths even
/// when the caller passed relative ones.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nonzero_exit_is_process_error() {
        let filter = ExternalFilter::new("DPEdge", "false", vec![], 2);
        let err = filter
            .run(Path::new("/tmp/in.jpg"), Path::new("/tmp/out.jpg"))
            .unwrap_err();
        match err {
            UnitError::Process { path, message } => {
                assert_eq!(path, PathBuf::from("/tmp/in.jpg"));
                assert!(message.contains("false"));
            }
            other => panic!("expected Process error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_program_is_process_error() {
        let filter = ExternalFilter::new("DPFunk1", "prism-no-such-program", vec![], 1);
        let err = filter
            .run(Path::new("in.jpg"), Path::new("out.jpg"))
            .unwrap_err();
        assert!(matches!(err, UnitError::Process { .. }));
    }

    #[test]
    fn test_zero_exit_succeeds() {
        let filter = ExternalFilter::new("DPFunk2", "true", vec![], 1);
        assert!(filter
            .run(Path::new("in.jpg"), Path::new("out.jpg"))
            .is_ok());
    }

    #[test]
    fn test_workers_floor_is_one() {
        let filter = ExternalFilter::new("DPEdge", "jpegedge", vec![], 0);
        assert_eq!(filter.workers(), 1);
    }
}
