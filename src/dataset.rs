//! # Dataset Loader
//!
//! Reads a review CSV into [`Record`]s. Required columns are `review` and
//! `sentiment`, matched case-insensitively; any other columns are ignored.
//!
//! Record ids are the zero-based position of the data row in the file, so
//! they stay stable across runs only while the file itself is unchanged.
//! Sampling draws without replacement from a ChaCha RNG seeded with the
//! caller's seed, which makes the sample (and its order) reproducible.

use csv::ReaderBuilder;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::config::DatasetConfig;
use crate::error::{Result, SentimentError};
use crate::models::Record;

pub const REVIEW_COLUMN: &str = "review";
pub const LABEL_COLUMN: &str = "sentiment";

/// Load records from `path`, sampling `max_rows` of them when the file is larger
pub fn load_dataset(path: &Path, max_rows: Option<usize>, seed: u64) -> Result<Vec<Record>> {
    if !path.is_file() {
        return Err(SentimentError::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(File::open(path)?);

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };

    let (review_idx, label_idx) = match (column(REVIEW_COLUMN), column(LABEL_COLUMN)) {
        (Some(review), Some(label)) => (review, label),
        (review, label) => {
            let missing = [(REVIEW_COLUMN, review), (LABEL_COLUMN, label)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(SentimentError::Schema {
                path: path.to_path_buf(),
                missing,
            });
        }
    };

    let mut records = Vec::new();
    for (position, row) in reader.records().enumerate() {
        let row = row?;
        let text = row.get(review_idx).unwrap_or_default();
        let label = row.get(label_idx).unwrap_or_default();
        records.push(Record::new(
            position as u64,
            text,
            label.trim().to_lowercase(),
        ));
    }

    debug!(path = %path.display(), total_rows = records.len(), "Read dataset");

    let sampled = matches!(max_rows, Some(n) if n < records.len());
    let records = match max_rows {
        Some(n) if sampled => sample_records(records, n, seed),
        _ => records,
    };

    info!(
        path = %path.display(),
        records = records.len(),
        sampled = sampled,
        seed = seed,
        "Dataset loaded"
    );

    Ok(records)
}

/// Load using the paths and sampling settings from configuration
pub fn load_from_config(config: &DatasetConfig) -> Result<Vec<Record>> {
    load_dataset(&config.path, config.max_rows, config.seed)
}

/// Draw exactly `amount` records without replacement, in draw order
fn sample_records(records: Vec<Record>, amount: usize, seed: u64) -> Vec<Record> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let picked = rand::seq::index::sample(&mut rng, records.len(), amount).into_vec();

    let mut slots: Vec<Option<Record>> = records.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
