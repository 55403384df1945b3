//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::ImageFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bais-analysis - statistics and charts for LLM anchoring-bias experiments
///
/// Computes percentile-bootstrap confidence intervals over trial results
/// and renders the summary charts used in the paper.
///
/// Examples:
///   bais-analysis bootstrap
///   bais-analysis --results-dir ./results --iterations 2000 stats
///   bais-analysis charts --format svg
///   bais-analysis --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(subcommand_required = false, arg_required_else_help = true)]
pub struct Args {
    /// Analysis to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory containing the JSONL result files
    ///
    /// Overrides `general.results_dir` from the config file.
    #[arg(short, long, value_name = "DIR", env = "BAIS_RESULTS_DIR", global = true)]
    pub results_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .bais-analysis.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Number of bootstrap resampling iterations
    #[arg(long, value_name = "N", global = true)]
    pub iterations: Option<usize>,

    /// Seed for the bootstrap random number generator
    #[arg(long, value_name = "SEED", global = true)]
    pub seed: Option<u64>,

    /// Two-sided significance level for bootstrap intervals
    #[arg(long, value_name = "ALPHA", global = true)]
    pub alpha: Option<f64>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Generate a default .bais-analysis.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Available analyses.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Bootstrap CI report for the configured result files
    Bootstrap {
        /// Output format (markdown, json)
        #[arg(long, default_value = "markdown", value_name = "FORMAT")]
        format: OutputFormat,

        /// Output file path for the report
        ///
        /// Defaults to the configured report file inside the results directory.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Descriptive statistics, t-tests and effect sizes for every model
    Stats,

    /// Render charts from trial data and the paper figures summary
    Charts {
        /// Directory to write charts to
        #[arg(long, value_name = "DIR")]
        figures_dir: Option<PathBuf>,

        /// Image formats to write (png, svg); defaults to the config file
        #[arg(long, value_name = "FORMATS", value_delimiter = ',')]
        format: Option<Vec<ImageFormat>>,
    },
}

/// Output format for the bootstrap report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.command.is_none() {
            return Err("No command given. Use bootstrap, stats or charts".to_string());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(iterations) = self.iterations {
            if iterations < crate::analysis::bootstrap::MIN_ITERATIONS {
                return Err(format!(
                    "Iterations must be at least {}",
                    crate::analysis::bootstrap::MIN_ITERATIONS
                ));
            }
        }

        if let Some(alpha) = self.alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err("Alpha must be between 0.0 and 1.0 (exclusive)".to_string());
            }
        }

        if let Some(ref dir) = self.results_dir {
            if !dir.exists() {
                return Err(format!("Results directory does not exist: {}", dir.display()));
            }
            if !dir.is_dir() {
                return Err(format!("Results path is not a directory: {}", dir.display()));
            }
        }

        if let Some(Command::Charts {
            format: Some(ref formats),
            ..
        }) = self.command
        {
            if formats.is_empty() {
                return Err("At least one chart format is required".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
