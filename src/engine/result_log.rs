use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::ResultRow;

/// Append-only writer for the JSONL results log
///
/// Every row is written and flushed on its own, so a crash loses at most the
/// rows of the batch in flight and never leaves a half-written row ahead of a
/// complete one.
#[derive(Debug)]
pub struct ResultLog {
    file: File,
    rows_written: usize,
}

impl ResultLog {
    /// Open `path` for appending, creating it and its parent directories
    ///
    /// If a previous run died mid-line, a newline is written first so the torn
    /// fragment stays on a line of its own.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        if ends_mid_line(&mut file)? {
            warn!(log_path = %path.display(), "Results log ends with a partial line; sealing it");
            file.write_all(b"\n")?;
            file.flush()?;
        }

        debug!(log_path = %path.display(), "Opened results log for append");

        Ok(Self {
            file,
            rows_written: 0,
        })
    }

    /// Append one row and flush it before returning
    pub fn append(&mut self, row: &ResultRow) -> Result<()> {
        let mut line = row.to_json_line()?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.rows_written += 1;
        Ok(())
    }

    /// Force written rows to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_data()?;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }
}

fn ends_mid_line(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnalysisOutcome, Record};
    use tempfile::TempDir;

    fn row(id: u64) -> ResultRow {
        ResultRow::from_record(
            &Record::new(id, format!("review {id}"), "positive"),
            AnalysisOutcome::error("Test", "stub"),
        )
    }

    #[test]
    fn test_creates_parent_directories_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/results.jsonl");

        let mut log = ResultLog::open(&path).unwrap();
        log.append(&row(1)).unwrap();
        log.append(&row(2)).unwrap();
        log.sync().unwrap();
        assert_eq!(log.rows_written(), 2);
        drop(log);

        let mut log = ResultLog::open(&path).unwrap();
        log.append(&row(3)).unwrap();
        drop(log);

        let contents = fs::read_to_string(&path).unwrap();
        let ids: Vec<u64> = contents
            .lines()
            .map(|l| serde_json::from_str::<ResultRow>(l).unwrap().id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_torn_tail_is_sealed_before_appending() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.jsonl");
        fs::write(&path, "{\"id\": 1, \"review\": \"cut").unwrap();

        let mut log = ResultLog::open(&path).unwrap();
        log.append(&row(2)).unwrap();
        drop(log);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(serde_json::from_str::<ResultRow>(lines[1]).unwrap().id, 2);
    }
}
