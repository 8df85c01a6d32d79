use serde::{Deserialize, Serialize};

/// Record represents one review and its ground-truth label
/// Built once by the dataset loader; `id` is the row's position in the source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub text: String,
    pub label: String,
}

impl Record {
    pub fn new(id: u64, text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            label: label.into(),
        }
    }
}
