//! gitops-validator - validates Flux and Kustomize GitOps repositories
//!
//! Builds a dependency graph over every manifest in a repository, checks that
//! references resolve and that everything is reachable from an entry point,
//! and reports the findings.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitops_validator::chart::ChartFormat;
use gitops_validator::cli::{
    ConfigSubcommand, OutputFormat, display_version, handle_config_command, init_logging,
    render_report,
};
use gitops_validator::results::AggregationOptions;
use gitops_validator::{ConfigLoader, Validator, ValidatorOptions};

/// Validates Flux and Kustomize GitOps repositories
#[derive(Parser, Debug)]
#[command(name = "gitops-validator")]
#[command(about = "Validates Flux and Kustomize GitOps repositories", long_about = None)]
struct Args {
    /// Config file (default: .gitops-validator.yaml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the GitOps repository (default: current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Additional deprecated APIs catalog
    #[arg(long)]
    yaml_path: Option<PathBuf>,

    /// Generate a dependency chart instead of validating
    #[arg(long, value_parser = ["mermaid", "tree", "json"])]
    chart: Option<String>,

    /// Write the chart to a file instead of stdout
    #[arg(long)]
    chart_output: Option<PathBuf>,

    /// Chart a single entry point
    #[arg(long)]
    chart_entrypoint: Option<String>,

    /// Run a predefined validation pipeline
    #[arg(long, value_parser = ["default", "fast", "comprehensive"])]
    pipeline: Option<String>,

    /// Run checks in parallel
    #[arg(long)]
    parallel: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Filter and summarize findings with a preset
    #[arg(long, value_parser = ["errors-only", "warnings-only", "summary", "grouped"])]
    aggregate: Option<String>,

    /// Deadline for each check, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

/// Main commands
#[derive(Subcommand, Debug)]
enum Command {
    /// Show version information
    Version,
    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    // Exit without waiting on blocking tasks left behind by timed-out checks
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    match &args.command {
        Some(Command::Version) => {
            display_version();
            return Ok(0);
        }
        Some(Command::Config { subcommand }) => {
            handle_config_command(subcommand, args.config.as_deref())?;
            return Ok(0);
        }
        None => {}
    }

    let config =
        ConfigLoader::load(args.config.as_deref()).context("Failed to load configuration")?;

    let repo = args
        .path
        .clone()
        .or_else(|| config.path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));

    let chart_format = match (&args.chart, config.chart.enabled) {
        (Some(format), _) => Some(format.parse::<ChartFormat>()?),
        (None, true) => Some(config.chart.format.parse::<ChartFormat>()?),
        (None, false) => None,
    };
    let chart_output = args
        .chart_output
        .clone()
        .or_else(|| config.chart.output.as_ref().map(PathBuf::from));

    let options = ValidatorOptions {
        pipeline: args.pipeline.clone(),
        parallel: args.parallel,
        check_timeout: Duration::from_secs(args.timeout_secs),
        deprecated_apis_file: args.yaml_path.clone(),
    };
    let validator = Validator::new(config, options);

    if let Some(format) = chart_format {
        let chart = validator.chart(&repo, format, args.chart_entrypoint.as_deref())?;
        match chart_output {
            Some(path) => {
                std::fs::write(&path, chart)
                    .with_context(|| format!("Failed to write chart to {}", path.display()))?;
                eprintln!("Chart written to: {}", path.display());
            }
            None => println!("{}", chart),
        }
        return Ok(0);
    }

    let report = validator.validate(&repo).await?;

    let aggregation = args.aggregate.as_deref().and_then(AggregationOptions::preset);
    let aggregated = aggregation.as_ref().map(|options| report.aggregate(options));
    let summary = aggregated
        .as_ref()
        .filter(|_| aggregation.as_ref().is_some_and(|options| options.include_stats));
    let shown = aggregated
        .as_ref()
        .map(|aggregated| aggregated.results.as_slice())
        .unwrap_or(report.findings.as_slice());

    print!("{}", render_report(shown, summary, args.output)?);
    Ok(report.exit_code())
}
