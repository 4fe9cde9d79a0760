//! phpcompat CLI - PHP cross-version compatibility checker
//!
//! Author: Tane Channel Technology

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use phpcompat::features::Availability;
use phpcompat::{
    check_file, AnalysisConfig, CompatError, Diagnostics, Feature, FeatureRegistry, RunState, TokenizerProfile,
    VersionRange,
};

/// phpcompat - PHP cross-version compatibility checker
#[derive(Parser, Debug)]
#[command(name = "phpcompat")]
#[command(author = "Tane Channel Technology")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Check PHP code against a range of PHP versions", long_about = None)]
struct Cli {
    /// Input PHP files
    #[arg(value_name = "INPUT", required_unless_present = "list_features")]
    inputs: Vec<PathBuf>,

    /// Target PHP versions, e.g. "7.4", "7.0-8.1", "7.4-" or "-8.0"
    #[arg(long, value_name = "RANGE", env = "PHPCOMPAT_VERSION", default_value = "")]
    php_version: String,

    /// Feature id never to report (repeatable)
    #[arg(long, value_name = "FEATURE")]
    exclude: Vec<String>,

    /// Tokenize as a PHP 7 tokenizer would (attributes become comments)
    #[arg(long)]
    legacy_tokenizer: bool,

    /// Emit JSON diagnostics to stderr
    #[arg(long)]
    diag_json: bool,

    /// Print the feature catalogue and exit
    #[arg(long)]
    list_features: bool,

    /// Show debug information
    #[arg(short, long)]
    debug: bool,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Result<AnalysisConfig, CompatError> {
    let mut config = AnalysisConfig::new(VersionRange::parse(&cli.php_version)?);
    for id in &cli.exclude {
        config.suppressed.insert(id.parse::<Feature>()?);
    }
    Ok(config)
}

fn list_features() {
    for descriptor in FeatureRegistry::global().descriptors() {
        let timeline: Vec<String> = descriptor
            .timeline
            .iter()
            .map(|(version, availability)| {
                let label = match availability {
                    Availability::Introduced => "introduced",
                    Availability::Deprecated => "deprecated",
                    Availability::Removed => "removed",
                };
                format!("{label} {version}")
            })
            .collect();
        println!(
            "{:<34} PHPC-{:<34} {}",
            descriptor.feature.id(),
            descriptor.code,
            timeline.join(", ")
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.list_features {
        list_features();
        return Ok(());
    }

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(2);
        }
    };
    if !config.range.is_configured() {
        tracing::warn!("no --php-version given; nothing will be reported");
    }

    let profile = if cli.legacy_tokenizer {
        TokenizerProfile::Legacy
    } else {
        TokenizerProfile::Modern
    };
    let run_state = RunState::new();

    let results: Vec<Result<Diagnostics>> = cli
        .inputs
        .par_iter()
        .map(|path| {
            check_file(path, &config, profile, &run_state)
                .with_context(|| format!("failed to check {}", path.display()))
        })
        .collect();

    let mut diags = Diagnostics::new();
    for result in results {
        diags.extend(result?);
    }

    print!("{}", diags.to_text());
    if cli.diag_json {
        eprintln!("{}", diags.to_json());
    }
    tracing::debug!(
        files = cli.inputs.len(),
        errors = diags.error_count(),
        warnings = diags.warning_count(),
        "run finished"
    );

    if diags.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
