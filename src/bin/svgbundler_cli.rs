//! Command line front-end for the drawable bundler.
//!
//! Loads the project configuration (file settings overridden by flags), runs
//! the pipeline and prints a run summary. Exits non-zero when any mask fails
//! so build scripts can stop on partial output.

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use svg_drawable_bundler::{pipeline, BundlerConfig, Density, OutputKind, OverrideMode};

#[derive(Parser)]
#[command(name = "svgbundler")]
#[command(about = "Expand qualified SVG sources into density-specific drawable resources")]
struct Cli {
    /// Project root containing the bundler configuration file.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Explicit configuration file path (defaults to
    /// `svgbundler.config.json` under the project root).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory of qualified SVG sources, overriding the configuration.
    #[arg(long)]
    sources_dir: Option<String>,

    /// Directory of mask templates, overriding the configuration.
    #[arg(long)]
    masks_dir: Option<String>,

    /// Output directory root, overriding the configuration.
    #[arg(long)]
    output_dir: Option<String>,

    /// Output kind (`drawable` or `mipmap`).
    #[arg(long, value_parser = OutputKind::from_str)]
    output_kind: Option<OutputKind>,

    /// Target density; may be given multiple times to replace the configured
    /// set.
    #[arg(long = "density", value_parser = Density::from_str)]
    densities: Vec<Density>,

    /// Override policy (`always`, `if-modified` or `never`).
    #[arg(long, value_parser = OverrideMode::from_str)]
    override_mode: Option<OverrideMode>,

    /// Discard mask combinations that reuse one source file across slots.
    #[arg(long)]
    use_same_svg_only_once: bool,

    /// Print every planned output destination.
    #[arg(long)]
    print_outputs: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => match BundlerConfig::from_path(path) {
            Some(config) => config,
            None => {
                eprintln!("failed to read configuration from {}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => BundlerConfig::discover(&cli.root),
    };

    if let Some(sources_dir) = cli.sources_dir {
        config.sources_dir = sources_dir;
    }
    if let Some(masks_dir) = cli.masks_dir {
        config.masks_dir = masks_dir;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(output_kind) = cli.output_kind {
        config.output_kind = output_kind;
    }
    if !cli.densities.is_empty() {
        config.densities = cli.densities;
    }
    if let Some(override_mode) = cli.override_mode {
        config.override_mode = override_mode;
    }
    if cli.use_same_svg_only_once {
        config.use_same_svg_only_once = true;
    }

    let report = match pipeline::run(&cli.root, &config) {
        Ok(report) => report,
        Err(error) => {
            eprintln!("bundler run failed: {error:#}");
            return ExitCode::FAILURE;
        }
    };

    println!(
        "{} resources ({} generated), {} rejected, {} masks failed, {} masks without output, {} planned outputs",
        report.resources.len(),
        report.generated,
        report.rejected.len(),
        report.failed_masks.len(),
        report.masks_without_output.len(),
        report.planned_outputs.len(),
    );
    if cli.print_outputs {
        for planned in &report.planned_outputs {
            println!(
                "{} @ {} -> {}",
                planned.resource,
                planned.density,
                planned.destination.display()
            );
        }
    }

    if report.failed_masks.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
