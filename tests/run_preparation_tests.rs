use sentiment_batch::engine::prepare_run;
use sentiment_batch::{SentimentConfig, SentimentError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_for(dataset: &Path, output: &Path, with_credentials: bool) -> SentimentConfig {
    let mut config = SentimentConfig::default();
    config.dataset.path = dataset.to_path_buf();
    config.dataset.max_rows = None;
    config.engine.output_path = output.to_path_buf();
    if with_credentials {
        config.backend.endpoint = Some("https://example.cognitiveservices.azure.com".to_string());
        config.backend.api_key = Some("test-key".to_string());
    } else {
        config.backend.endpoint = None;
        config.backend.api_key = None;
    }
    config
}

#[test]
fn test_missing_credentials_fail_before_dataset_is_read() {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("absent/reviews.csv");
    let output = dir.path().join("out/results.jsonl");

    let err = prepare_run(&config_for(&dataset, &output, false)).unwrap_err();

    assert!(matches!(err, SentimentError::ConfigurationError(_)));
    assert!(!dir.path().join("out").exists());
    assert!(!output.exists());
}

#[test]
fn test_missing_dataset_is_reported_once_credentials_resolve() {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("absent/reviews.csv");
    let output = dir.path().join("out/results.jsonl");

    let err = prepare_run(&config_for(&dataset, &output, true)).unwrap_err();

    assert!(matches!(err, SentimentError::DatasetNotFound { .. }));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_prepared_run_holds_every_record() {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("reviews.csv");
    fs::write(
        &dataset,
        "review,sentiment\n\"loved it\",positive\n\"hated it\",negative\n",
    )
    .unwrap();
    let output = dir.path().join("out/results.jsonl");

    let prepared = prepare_run(&config_for(&dataset, &output, true)).unwrap();

    assert_eq!(prepared.records.len(), 2);
    assert_eq!(prepared.records[0].label, "positive");
    assert!(!output.exists());
}
