//! Run command handler for the sentiment CLI

use anyhow::Context;
use sentiment_batch::engine::{prepare_run, PreparedRun};
use sentiment_batch::{
    BatchEngine, BatchObserver, BatchReport, RunSummary, SentimentBackend,
    SentimentConfig, TracingObserver,
};

use crate::RunArgs;

/// Prints batch progress to the terminal and forwards every report to tracing
#[derive(Debug, Default)]
struct ProgressPrinter {
    batches_total: usize,
    tracing: TracingObserver,
}

impl BatchObserver for ProgressPrinter {
    fn on_start(&mut self, summary: &RunSummary) {
        self.batches_total = summary.batches_total;
        println!("  Already processed: {}", summary.already_processed);
        println!("  Remaining: {}", summary.remaining);
    }

    fn on_batch(&mut self, report: &BatchReport) {
        match report {
            BatchReport::Completed {
                index,
                rows_written,
                document_errors,
                ..
            } => {
                let errors = if *document_errors > 0 {
                    format!(" ({document_errors} document errors)")
                } else {
                    String::new()
                };
                println!(
                    "✓ Batch {}/{}: {} rows written{}",
                    index + 1,
                    self.batches_total,
                    rows_written,
                    errors
                );
            }
            BatchReport::Failed { index, ids, cause } => {
                eprintln!(
                    "✗ Batch {}/{} failed ({} records, retried on next run): {}",
                    index + 1,
                    self.batches_total,
                    ids.len(),
                    cause
                );
            }
        }
        self.tracing.on_batch(report);
    }
}

pub async fn handle_run_command(args: RunArgs, mut config: SentimentConfig) -> anyhow::Result<()> {
    if let Some(path) = args.dataset {
        config.dataset.path = path;
    }
    if let Some(max_rows) = args.max_rows {
        config.dataset.max_rows = Some(max_rows);
    }
    if let Some(seed) = args.seed {
        config.dataset.seed = seed;
    }
    if let Some(batch_size) = args.batch_size {
        config.engine.batch_size = batch_size;
    }
    if let Some(output) = args.output {
        config.engine.output_path = output;
    }
    config.validate()?;

    let PreparedRun { backend, records } =
        prepare_run(&config).context("Failed to prepare the run")?;
    println!(
        "✓ Loaded {} records from {}",
        records.len(),
        config.dataset.path.display()
    );

    println!(
        "Classifying with {} in batches of {} into {}",
        backend.name(),
        config.engine.batch_size,
        config.engine.output_path.display()
    );

    let engine = BatchEngine::new(backend, config.engine.clone());
    let mut progress = ProgressPrinter::default();
    let summary = engine
        .run_with_observer(
            &records,
            config.engine.batch_size,
            &config.engine.output_path,
            &mut progress,
        )
        .await?;

    if summary.was_noop() {
        println!("Nothing left to process");
        return Ok(());
    }

    println!("\nRun {} finished:", summary.run_id);
    println!(
        "  Batches: {} completed, {} failed of {}",
        summary.batches_completed, summary.batches_failed, summary.batches_total
    );
    println!("  Rows written: {}", summary.rows_written);
    println!("  Document errors: {}", summary.document_errors);
    if !summary.is_complete() {
        println!("  Some batches failed; rerun the same command to retry them");
    }

    Ok(())
}
