//! Prism CLI - Pipelined batch image filtering.
//!
//! Prism applies a selected filter to a batch of image files through a
//! three-stage pipeline (read, process, write) with bounded-buffer
//! backpressure. Data-parallel filters fan their computation across worker
//! threads.
//!
//! # Usage
//!
//! ```bash
//! # Invert three images into ./out
//! prism run a.jpg b.jpg c.jpg --filter Invert --target-dir ./out
//!
//! # Data-parallel median over a whole directory, 4 workers per image
//! prism run ./photos --filter DPMedian --target-dir ./out --workers 4
//!
//! # List the filter catalog
//! prism filters
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Prism - Pipelined batch image filtering.
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a filter over a batch of images
    Run(cli::run::RunArgs),

    /// List the filter catalog
    Filters,

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go straight to stderr.
    let config = match prism_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `prism config path`."
            );
            prism_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("Prism v{}", prism_core::VERSION);

    match cli.command {
        Commands::Run(args) => cli::run::execute(args, config),
        Commands::Filters => cli::filters::execute(&config),
        Commands::Config(args) => cli::config::execute(args),
    }
}
