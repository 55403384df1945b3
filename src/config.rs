//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.bais-analysis.toml` files.

use crate::analysis::bootstrap::{DEFAULT_ALPHA, DEFAULT_ITERATIONS, DEFAULT_SEED};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".bais-analysis.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Bootstrap settings.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    /// Chart settings.
    #[serde(default)]
    pub charts: ChartsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding the JSONL results and summary files.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    /// Directory charts are written to.
    #[serde(default = "default_figures_dir")]
    pub figures_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            figures_dir: default_figures_dir(),
        }
    }
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("results")
}

fn default_figures_dir() -> PathBuf {
    PathBuf::from("figures")
}

/// A labelled results file analyzed by the bootstrap report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultFile {
    /// Display label, e.g. `GPT-4o (temp=0)`.
    pub label: String,
    /// File name relative to the results directory.
    pub file: String,
}

impl ResultFile {
    fn new(label: &str, file: &str) -> Self {
        Self {
            label: label.to_string(),
            file: file.to_string(),
        }
    }
}

/// Bootstrap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Resampling iterations.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Generator seed.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Two-sided significance level.
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Condition id of the low anchor.
    #[serde(default = "default_low_condition")]
    pub low_condition: String,

    /// Condition id of the high anchor.
    #[serde(default = "default_high_condition")]
    pub high_condition: String,

    /// Report file name inside the results directory.
    #[serde(default = "default_report_file")]
    pub report_file: String,

    /// Files to analyze, in report order.
    #[serde(default = "default_files")]
    pub files: Vec<ResultFile>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            seed: default_seed(),
            alpha: default_alpha(),
            low_condition: default_low_condition(),
            high_condition: default_high_condition(),
            report_file: default_report_file(),
            files: default_files(),
        }
    }
}

fn default_iterations() -> usize {
    DEFAULT_ITERATIONS
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_alpha() -> f64 {
    DEFAULT_ALPHA
}

fn default_low_condition() -> String {
    "low-anchor-3mo".to_string()
}

fn default_high_condition() -> String {
    "high-anchor-9mo".to_string()
}

fn default_report_file() -> String {
    "bootstrap-ci-analysis.md".to_string()
}

fn default_files() -> Vec<ResultFile> {
    vec![
        ResultFile::new(
            "GPT-4o (temp=0)",
            "github-copilot-gpt-4o-anchoring-temp0-30.jsonl",
        ),
        ResultFile::new("Sonnet 4 (dated, temp=0)", "sonnet-dated-temp0-30.jsonl"),
    ]
}

/// Image formats charts can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Bitmap
    Png,
    /// Vector
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// Chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    /// Default chart width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Default chart height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Formats each chart is written in.
    #[serde(default = "default_formats")]
    pub formats: Vec<ImageFormat>,

    /// Heatmap color scale runs from `-heatmap_limit` to `+heatmap_limit` months.
    #[serde(default = "default_heatmap_limit")]
    pub heatmap_limit: f64,

    /// Name of the paper figures summary file inside the results directory.
    #[serde(default = "default_paper_figures")]
    pub paper_figures: String,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            formats: default_formats(),
            heatmap_limit: default_heatmap_limit(),
            paper_figures: default_paper_figures(),
        }
    }
}

fn default_width() -> u32 {
    1000
}

fn default_height() -> u32 {
    800
}

fn default_formats() -> Vec<ImageFormat> {
    vec![ImageFormat::Png, ImageFormat::Svg]
}

fn default_heatmap_limit() -> f64 {
    20.0
}

fn default_paper_figures() -> String {
    "paper-figures.json".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.results_dir {
            self.general.results_dir = dir.clone();
        }
        if let Some(iterations) = args.iterations {
            self.bootstrap.iterations = iterations;
        }
        if let Some(seed) = args.seed {
            self.bootstrap.seed = seed;
        }
        if let Some(alpha) = args.alpha {
            self.bootstrap.alpha = alpha;
        }
    }

    /// Path of a file inside the results directory.
    pub fn results_path(&self, name: &str) -> PathBuf {
        self.general.results_dir.join(name)
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.results_dir, PathBuf::from("results"));
        assert_eq!(config.bootstrap.iterations, 10_000);
        assert_eq!(config.bootstrap.seed, 42);
        assert_eq!(config.bootstrap.files.len(), 2);
        assert_eq!(config.charts.formats, vec![ImageFormat::Png, ImageFormat::Svg]);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
results_dir = "data/results"

[bootstrap]
iterations = 2000
seed = 123456789
low_condition = "low"

[[bootstrap.files]]
label = "Llama 3.3"
file = "llama33-anchoring.jsonl"

[charts]
formats = ["svg"]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.results_dir, PathBuf::from("data/results"));
        assert_eq!(config.bootstrap.iterations, 2000);
        assert_eq!(config.bootstrap.seed, 123456789);
        assert_eq!(config.bootstrap.low_condition, "low");
        assert_eq!(config.bootstrap.high_condition, "high-anchor-9mo");
        assert_eq!(
            config.bootstrap.files,
            vec![ResultFile::new("Llama 3.3", "llama33-anchoring.jsonl")]
        );
        assert_eq!(config.charts.formats, vec![ImageFormat::Svg]);
        assert_eq!(config.charts.width, 1000);
    }

    #[test]
    fn test_verbosity_is_cli_only() {
        assert!(!Config::default_toml().contains("verbose"));

        let config: Config =
            toml::from_str("[general]\nresults_dir = \"r\"\nverbose = true\n").unwrap();
        assert_eq!(config.general.results_dir, PathBuf::from("r"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[bootstrap]\nseed = 7\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.bootstrap.seed, 7);

        std::fs::write(&path, "[bootstrap\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[bootstrap]"));
        assert!(toml_str.contains("[[bootstrap.files]]"));
        assert!(toml_str.contains("[charts]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.bootstrap.files.len(), 2);
    }
}
