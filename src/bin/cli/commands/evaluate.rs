//! Evaluate command handler for the sentiment CLI

use anyhow::Context;
use sentiment_batch::{evaluate_log, MalformedLinePolicy, SentimentConfig};

use crate::{EvaluateArgs, OutputFormat};

pub fn handle_evaluate_command(args: EvaluateArgs, mut config: SentimentConfig) -> anyhow::Result<()> {
    if let Some(label) = args.mixed_as {
        config.evaluation.label_policy.mixed = label;
    }
    if let Some(label) = args.neutral_as {
        config.evaluation.label_policy.neutral = label;
    }
    if args.strict {
        config.evaluation.malformed_lines = MalformedLinePolicy::Fail;
    }

    let log_path = args.log.unwrap_or_else(|| config.engine.output_path.clone());
    let report = evaluate_log(&log_path, &config.evaluation)
        .with_context(|| format!("Failed to evaluate {}", log_path.display()))?;

    match args.format {
        OutputFormat::Table => print!("{report}"),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
