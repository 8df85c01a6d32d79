//! # Sentiment CLI Tool
//!
//! Command-line interface for running resumable batch sentiment analysis over a
//! review dataset and evaluating the collected results.

mod cli;

use clap::{Args, Parser, Subcommand, ValueEnum};
use sentiment_batch::evaluation::EvalLabel;
use sentiment_batch::logging::{init_structured_logging, log_error};
use sentiment_batch::{ConfigManager, SentimentError};
use std::path::PathBuf;
use tracing::info;

use cli::{handle_evaluate_command, handle_run_command};

#[derive(Parser, Debug)]
#[command(name = "sentiment-cli")]
#[command(about = "Resumable batch sentiment analysis with offline evaluation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file path (default: ./sentiment.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Subcommands
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Classify every record not yet present in the results log
    Run(RunArgs),

    /// Score a results log against its ground-truth labels
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Sample this many records from the dataset
    #[arg(short = 'n', long)]
    pub max_rows: Option<usize>,

    /// Documents per service call (default: engine.batch_size)
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Results log path (default: engine.output_path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Input CSV path (default: dataset.path)
    #[arg(short, long)]
    pub dataset: Option<PathBuf>,

    /// Sampling seed (default: dataset.seed)
    #[arg(short, long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Results log to evaluate (default: engine.output_path)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Evaluation label for the service's "mixed" sentiment
    #[arg(long, value_name = "LABEL")]
    pub mixed_as: Option<EvalLabel>,

    /// Evaluation label for the service's "neutral" sentiment
    #[arg(long, value_name = "LABEL")]
    pub neutral_as: Option<EvalLabel>,

    /// Fail on the first malformed log line instead of skipping it
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_structured_logging(cli.verbose);

    let manager = ConfigManager::load(cli.config.as_deref())?;
    info!(
        config_source = ?manager.source(),
        config = %manager.debug_config(),
        "Sentiment CLI starting"
    );
    let config = manager.into_config();

    let (operation, result) = match cli.command {
        Commands::Run(args) => ("run", handle_run_command(args, config).await),
        Commands::Evaluate(args) => ("evaluate", handle_evaluate_command(args, config)),
    };

    if let Err(e) = &result {
        let context = e
            .downcast_ref::<SentimentError>()
            .filter(|e| e.is_startup_error())
            .map(|_| "failed before any results were written");
        log_error("sentiment-cli", operation, &format!("{e:#}"), context);
    }

    result
}
