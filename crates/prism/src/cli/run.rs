//! The `prism run` command: submit one batch job and report its outcomes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use prism_core::{AppStats, Config, Filter, JobReport, JobSpec, Pipeline, StatsSnapshot};
use walkdir::WalkDir;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input image files or directories (directories are expanded recursively)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Filter to apply (see `prism filters`)
    #[arg(short, long)]
    pub filter: String,

    /// Directory receiving the output files (created if missing)
    #[arg(short, long)]
    pub target_dir: PathBuf,

    /// Worker count for data-parallel filters
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Number of concurrent processor stage workers
    #[arg(long)]
    pub processors: Option<usize>,

    /// Write a JSON report of all outcomes to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Execute the run command.
pub fn execute(args: RunArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(processors) = args.processors {
        config.pipeline.processor_workers = processors.max(1);
    }
    let workers = args.workers.unwrap_or(config.processing.dp_workers);
    let filter = Filter::parse(&args.filter, workers, &config.external)?;

    let inputs = expand_inputs(&args.inputs, &config.processing.supported_formats);
    anyhow::ensure!(!inputs.is_empty(), "No input files found");
    std::fs::create_dir_all(&args.target_dir)?;

    tracing::info!(
        "Running {} over {} file(s) into {:?}",
        filter.name(),
        inputs.len(),
        args.target_dir
    );

    let stats = Arc::new(AppStats::new());
    let pipeline = Pipeline::start(&config.pipeline, Arc::clone(&stats));
    let handle = pipeline.submit(JobSpec {
        inputs,
        target_dir: args.target_dir.clone(),
        filter,
    })?;

    // Drive the progress bar off completed outcomes until the job is done.
    let progress = create_progress_bar();
    while !handle.is_done() {
        let (completed, submitted) = handle.progress();
        progress.set_length(submitted as u64);
        progress.set_position(completed as u64);
        std::thread::sleep(Duration::from_millis(100));
    }
    progress.finish_and_clear();

    let report = handle.wait();
    pipeline.shutdown();

    print_outcomes(&report);
    print_summary(&report, &stats.snapshot());

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("Report written to {:?}", path);
    }

    if report.failed > 0 {
        anyhow::bail!("{} of {} files failed", report.failed, report.submitted);
    }
    Ok(())
}

/// Expand the input arguments into a flat, ordered file list.
///
/// Directories are walked recursively and filtered by the supported-format
/// extension whitelist, sorted for deterministic ordering. Plain file
/// arguments pass through untouched, even if missing: the pipeline turns a
/// missing file into a per-unit failure outcome rather than aborting here.
fn expand_inputs(inputs: &[PathBuf], supported_formats: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_file() && is_supported(e.path(), supported_formats))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Check if a file has a supported extension.
fn is_supported(path: &Path, supported_formats: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_formats
                .iter()
                .any(|fmt| fmt.to_lowercase() == ext_lower)
        })
        .unwrap_or(false)
}

/// Create the progress bar for the batch run.
fn create_progress_bar() -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb
}

/// List every outcome, failures with their reason.
fn print_outcomes(report: &JobReport) {
    for outcome in &report.outcomes {
        if outcome.success {
            let output = outcome
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            println!("ok   {} -> {}", outcome.input_path.display(), output);
        } else {
            let reason = outcome.error.as_deref().unwrap_or("unknown error");
            println!("FAIL {} ({})", outcome.input_path.display(), reason);
        }
    }
}

/// Print a formatted summary after the run.
fn print_summary(report: &JobReport, snapshot: &StatsSnapshot) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Filter:       {:>10}", report.filter);
    eprintln!("    Succeeded:    {:>10}", report.succeeded);
    if report.failed > 0 {
        eprintln!("    Failed:       {:>10}", report.failed);
    }
    if report.canceled {
        eprintln!("    Canceled:            yes");
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Reading:      {:>9.1}s", report.read_millis as f64 / 1000.0);
    eprintln!("    Processing:   {:>9.1}s", report.process_millis as f64 / 1000.0);
    eprintln!("    Writing:      {:>9.1}s", report.write_millis as f64 / 1000.0);
    eprintln!("    Total:        {:>9.1}s", report.total_millis as f64 / 1000.0);
    for filter in &snapshot.filters {
        eprintln!(
            "    {:<12} {:>8.1} MB/s",
            format!("{}:", filter.filter),
            filter.throughput_mb_per_sec
        );
    }
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_is_supported_case_insensitive() {
        assert!(is_supported(Path::new("a.PNG"), &formats()));
        assert!(is_supported(Path::new("a.jpg"), &formats()));
        assert!(!is_supported(Path::new("a.txt"), &formats()));
        assert!(!is_supported(Path::new("noext"), &formats()));
    }

    #[test]
    fn test_expand_inputs_walks_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        std::fs::write(dir.path().join("skip.txt"), b"x").unwrap();

        let files = expand_inputs(&[dir.path().to_path_buf()], &formats());
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_expand_inputs_passes_plain_files_through() {
        // Missing files and unsupported extensions are kept verbatim; the
        // pipeline reports them as failures instead.
        let files = expand_inputs(&[PathBuf::from("/no/such.png")], &formats());
        assert_eq!(files, vec![PathBuf::from("/no/such.png")]);
    }
}
