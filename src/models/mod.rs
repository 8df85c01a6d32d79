pub mod outcome;
pub mod record;
pub mod result_row;

// Re-export models for easy access
pub use outcome::{AnalysisOutcome, ConfidenceScores, Sentiment};
pub use record::Record;
pub use result_row::ResultRow;
