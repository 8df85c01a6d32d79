use serde_json::Value;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::models::result_row::id_from_value;

/// Ids already recorded in a results log
///
/// Rebuilt from the log at the start of every run. Scanning is best-effort:
/// a line that is not valid JSON (including a torn final line) is skipped,
/// and so is a row without a usable integer `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedSet {
    ids: HashSet<u64>,
    malformed_lines: usize,
    rows_without_id: usize,
}

impl ProcessedSet {
    /// Scan `path`; a missing file yields an empty set
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(log_path = %path.display(), "No results log yet");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut set = Self::default();
        // Split on raw bytes so invalid UTF-8 only costs the line it is on
        for line in BufReader::new(file).split(b'\n') {
            set.ingest(&line?);
        }

        debug!(
            log_path = %path.display(),
            processed = set.ids.len(),
            malformed_lines = set.malformed_lines,
            rows_without_id = set.rows_without_id,
            "Reconstructed processed set"
        );

        Ok(set)
    }

    fn ingest(&mut self, line: &[u8]) {
        if line.iter().all(u8::is_ascii_whitespace) {
            return;
        }

        let value: Value = match serde_json::from_slice(line) {
            Ok(value) => value,
            Err(_) => {
                self.malformed_lines += 1;
                return;
            }
        };

        match value.get("id").and_then(id_from_value) {
            Some(id) => {
                self.ids.insert(id);
            }
            None => self.rows_without_id += 1,
        }
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn malformed_lines(&self) -> usize {
        self.malformed_lines
    }

    pub fn rows_without_id(&self) -> usize {
        self.rows_without_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let set = ProcessedSet::load(&dir.path().join("absent.jsonl")).unwrap();
        assert!(set.is_empty());
        assert!(!dir.path().join("absent.jsonl").exists());
    }

    #[test]
    fn test_corrupt_and_idless_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.jsonl");
        let mut contents = Vec::new();
        contents.extend_from_slice(b"{\"id\": 1, \"review\": \"a\"}\n");
        contents.extend_from_slice(b"\n");
        contents.extend_from_slice(b"{\"review\": \"no id\"}\n");
        contents.extend_from_slice(b"{\"id\": \"2\"}\n");
        contents.extend_from_slice(b"{\"id\": null}\n");
        contents.extend_from_slice(b"\xff\xfe not utf8\n");
        contents.extend_from_slice(b"{\"id\": 3.0}\n");
        contents.extend_from_slice(b"{\"id\": 4, \"review\": \"torn");
        fs::write(&path, contents).unwrap();

        let set = ProcessedSet::load(&path).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(1) && set.contains(2) && set.contains(3));
        assert!(!set.contains(4));
        assert_eq!(set.malformed_lines(), 2);
        assert_eq!(set.rows_without_id(), 2);
    }
}
