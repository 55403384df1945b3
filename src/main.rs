//! bais-analysis - statistics and charts for LLM anchoring-bias experiments
//!
//! Loads JSONL trial results, computes percentile-bootstrap confidence
//! intervals and per-model statistics, and renders the summary charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (bad config, unreadable file, etc.) or no usable data

mod analysis;
mod charts;
mod cli;
mod config;
mod loader;
mod models;
mod report;

use analysis::bootstrap::Bootstrap;
use anyhow::{Context, Result};
use charts::{
    AnchoringHeatmap, ChartRenderer, ConvergenceChart, MadByDomainChart, MadHeatmap,
    ModelTaxonomyChart, SacdByModelChart, SacdComparisonChart, TechniqueRankingChart,
};
use chrono::Utc;
use cli::{Args, Command, OutputFormat};
use config::{Config, ImageFormat, CONFIG_FILE_NAME};
use indicatif::{ProgressBar, ProgressStyle};
use loader::ANCHOR_VALUES_FILE;
use models::{BootstrapMetadata, BootstrapReport};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        match handle_init_config() {
            Ok(code) => std::process::exit(code),
            Err(e) => {
                eprintln!("❌ Error: {:#}", e);
                std::process::exit(1);
            }
        }
    }

    init_logging(&args);

    info!("bais-analysis v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .bais-analysis.toml.
fn handle_init_config() -> Result<i32> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        return Ok(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the results directory, bootstrap and chart settings.");
    Ok(0)
}

/// Initialize logging based on verbosity settings. `RUST_LOG` overrides
/// the level when set.
fn init_logging(args: &Args) {
    let level = LevelFilter::from_level(args.log_level());
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load the configuration and dispatch to the chosen command.
fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    debug!("Configuration: {:?}", config);

    match args.command {
        Some(Command::Bootstrap { format, output }) => {
            run_bootstrap(&config, format, output, args.quiet)
        }
        Some(Command::Stats) => run_stats(&config, args.quiet),
        Some(Command::Charts {
            figures_dir,
            format,
        }) => run_charts(&config, figures_dir, format),
        None => Ok(1),
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Progress bar for per-file or per-model work; hidden in quiet mode.
fn progress_bar(len: u64, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

fn configured_bootstrap(config: &Config) -> Result<Bootstrap> {
    let settings = &config.bootstrap;
    Bootstrap::new(settings.iterations, settings.seed, settings.alpha)
        .context("Invalid bootstrap settings")
}

/// Bootstrap CI report over the configured result files.
fn run_bootstrap(
    config: &Config,
    format: OutputFormat,
    output: Option<PathBuf>,
    quiet: bool,
) -> Result<i32> {
    let settings = &config.bootstrap;
    let bootstrap = configured_bootstrap(config)?;

    println!(
        "📥 Loading {} result file(s) from {}",
        settings.files.len(),
        config.general.results_dir.display()
    );
    println!(
        "   Bootstrap: {} iterations, seed {}, alpha {}",
        bootstrap.iterations(),
        bootstrap.seed(),
        bootstrap.alpha()
    );

    let pb = progress_bar(settings.files.len() as u64, quiet)?;
    let mut samples = Vec::new();
    let mut analyses = Vec::new();

    for file in &settings.files {
        pb.set_message(file.label.clone());
        let path = config.results_path(&file.file);

        let Some(records) = pb.suspend(|| loader::load_optional_jsonl(&path))? else {
            pb.inc(1);
            continue;
        };

        let file_samples = analysis::AnchoringSamples::from_records(
            &file.label,
            &file.file,
            &records,
            &settings.low_condition,
            &settings.high_condition,
        );
        let result = analysis::analyze_anchoring(&file_samples, &bootstrap)?;

        pb.suspend(|| {
            println!(
                "   {}: {} records (low n={}, high n={})",
                file.label,
                records.len(),
                result.n_low,
                result.n_high
            )
        });

        analyses.push(result);
        samples.push(file_samples);
        pb.inc(1);
    }

    pb.finish_and_clear();

    if analyses.is_empty() {
        println!("❌ No result files found");
        return Ok(1);
    }

    let comparisons = analysis::compare_models(&samples, &bootstrap)?;
    debug!("{} cross-model comparison(s)", comparisons.len());

    let report = BootstrapReport {
        metadata: BootstrapMetadata {
            generated: Utc::now(),
            iterations: bootstrap.iterations(),
            seed: bootstrap.seed(),
            alpha: bootstrap.alpha(),
        },
        analyses,
        comparisons,
    };

    println!("\n📝 Generating report...");

    let (content, default_path) = match format {
        OutputFormat::Markdown => (
            report::generate_bootstrap_markdown(&report),
            config.results_path(&settings.report_file),
        ),
        OutputFormat::Json => (
            report::generate_bootstrap_json(&report)?,
            config
                .results_path(&settings.report_file)
                .with_extension("json"),
        ),
    };
    let path = output.unwrap_or(default_path);
    report::save_report(&content, &path)?;

    println!("\n📊 Anchoring effects ({}% CI):", bootstrap.confidence_percent());
    for result in &report.analyses {
        match &result.effect {
            Some(effect) => println!(
                "   {}: {} [{:.2}, {:.2}]",
                result.model,
                report::format_effect(effect.difference.estimate),
                effect.difference.lower,
                effect.difference.upper
            ),
            None => println!("   {}: insufficient data", result.model),
        }
    }

    println!("\n✅ Report saved to: {}", path.display());
    Ok(0)
}

/// Statistics over every JSONL file in the results directory.
fn run_stats(config: &Config, quiet: bool) -> Result<i32> {
    let results_dir = &config.general.results_dir;
    let bootstrap = configured_bootstrap(config)?;

    println!("📥 Loading results from {}", results_dir.display());
    let files = loader::discover_jsonl(results_dir, "");
    let records = loader::load_all(&files)?;
    println!(
        "   Loaded {} records from {} file(s)",
        records.len(),
        files.len()
    );

    let model_count = analysis::group_by_model(&records).len();
    println!("   Found {} models", model_count);

    let pb = progress_bar(model_count as u64, quiet)?;
    let report = analysis::compute_statistics(&records, &bootstrap, |model| {
        pb.set_message(model.to_string());
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    if report.models.is_empty() {
        println!("❌ No valid data found");
        return Ok(1);
    }

    println!("\n📝 Generating report...");

    let json_path = config.results_path("statistics.json");
    report::save_report(&report::generate_statistics_json(&report)?, &json_path)?;
    println!("   Saved: {}", json_path.display());

    let md_path = config.results_path("statistics.md");
    report::save_report(&report::generate_statistics_markdown(&report), &md_path)?;
    println!("   Saved: {}", md_path.display());

    println!("\n📊 Summary:");
    for (model, stats) in &report.models {
        let Some(effect) = stats.anchoring_effect else {
            continue;
        };
        let d = stats
            .cohens_d
            .map(|d| format!("{:.2}", d))
            .unwrap_or_else(|| "N/A".to_string());
        let marker = match stats.ttest {
            Some(t) if t.p < 0.05 => "*",
            _ => "",
        };
        println!("   {}: effect={:.1}mo, d={}{}", model, effect, d, marker);
    }
    println!("\n   * = p < 0.05");

    println!(
        "\n✅ Statistics complete: {} / {} models significant after Bonferroni correction",
        report.significant_after_correction(),
        report.num_comparisons
    );
    Ok(0)
}

/// Render every chart whose input data is available.
fn run_charts(
    config: &Config,
    figures_dir: Option<PathBuf>,
    formats: Option<Vec<ImageFormat>>,
) -> Result<i32> {
    let dir = figures_dir.unwrap_or_else(|| config.general.figures_dir.clone());
    let formats = formats.unwrap_or_else(|| config.charts.formats.clone());
    let renderer = ChartRenderer::new(&dir, &config.charts, &formats);
    let results_dir = &config.general.results_dir;
    let mut written = Vec::new();

    println!("📥 Loading chart data from {}", results_dir.display());

    match loader::load_anchor_values(&config.results_path(ANCHOR_VALUES_FILE))? {
        Some(anchors) if !anchors.is_empty() => {
            let low = loader::load_all(&loader::discover_jsonl(results_dir, "low-anchor-"))?;
            let high =
                loader::load_all(&loader::discover_jsonl(&results_dir.join("high-anchor"), ""))?;
            let sacd = loader::load_all(&loader::discover_jsonl(results_dir, "sacd-"))?;
            println!(
                "   Trials: {} low anchor, {} high anchor, {} SACD",
                low.len(),
                high.len(),
                sacd.len()
            );

            let profiles = analysis::build_model_profiles(&anchors, &low, &high, &sacd);
            println!("   Models with anchor values: {}", profiles.len());

            written.extend(renderer.render(&AnchoringHeatmap::new(
                &profiles,
                config.charts.heatmap_limit,
            ))?);
            match SacdComparisonChart::new(&profiles) {
                Some(chart) => written.extend(renderer.render(&chart)?),
                None => println!("   No SACD data available for comparison chart"),
            }
            written.extend(renderer.render(&ModelTaxonomyChart::new(&profiles))?);
        }
        _ => println!("   No anchor values, skipping trial charts"),
    }

    match loader::load_paper_figures(&config.results_path(&config.charts.paper_figures))? {
        Some(figures) => {
            if let Some(ref ranking) = figures.technique_ranking {
                written.extend(renderer.render(&TechniqueRankingChart::new(ranking))?);
            }
            if !figures.sacd_by_model.is_empty() {
                written.extend(renderer.render(&SacdByModelChart::new(&figures.sacd_by_model))?);
            }
            if !figures.convergence.is_empty() {
                written.extend(renderer.render(&ConvergenceChart::new(&figures.convergence))?);
            }
            if let Some(ref mad) = figures.mad_by_domain {
                written.extend(renderer.render(&MadByDomainChart::new(mad))?);
                written.extend(renderer.render(&MadHeatmap::new(mad))?);
            }
        }
        None => println!(
            "   No {} found, skipping paper figures",
            config.charts.paper_figures
        ),
    }

    if written.is_empty() {
        println!("❌ No charts rendered: no input data found");
        return Ok(1);
    }

    println!("\n📊 Charts:");
    for path in &written {
        println!("   {}", path.display());
    }
    println!(
        "\n✅ Saved {} file(s) to {}",
        written.len(),
        renderer.dir().display()
    );
    Ok(0)
}
