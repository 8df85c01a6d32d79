#![allow(dead_code)]

pub mod stub_backend;

pub use stub_backend::*;

use sentiment_batch::{Record, ResultRow};
use std::fs;
use std::path::Path;

/// Records with ids 0..n and texts `review {id}`
pub fn sequential_records(n: u64) -> Vec<Record> {
    (0..n)
        .map(|id| {
            let label = if id % 2 == 0 { "positive" } else { "negative" };
            Record::new(id, format!("review {id}"), label)
        })
        .collect()
}

/// Every parseable row of a results log, in file order
pub fn read_rows(path: &Path) -> Vec<ResultRow> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

pub fn row_ids(path: &Path) -> Vec<u64> {
    read_rows(path).iter().map(|row| row.id).collect()
}
