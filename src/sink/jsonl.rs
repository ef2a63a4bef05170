//! JSON-lines metrics store.
//!
//! One `WindowSummary` per line, appended as windows close. The same
//! file serves the read-back surface behind the status, history and
//! export commands. Partial or malformed lines (an interrupted write,
//! hand edits) are skipped on read with a warning.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::analyzer::WindowSummary;
use crate::sink::{MetricsSink, SinkError};

/// Default row count for recent-history reads.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Append-only JSONL store of window summaries.
pub struct JsonlStore {
    path: PathBuf,
    file: File,
}

impl JsonlStore {
    /// Open the store for appending, creating the file and its parent
    /// directory as needed.
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SinkError::Io(e.to_string()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SinkError::Io(format!("{}: {e}", path.display())))?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Location of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored summaries in append order.
    pub fn read_all(&self) -> Result<Vec<WindowSummary>, SinkError> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| SinkError::Io(format!("{}: {e}", self.path.display())))?;

        let mut rows = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<WindowSummary>(trimmed) {
                Ok(summary) => rows.push(summary),
                Err(e) => warn!("{}: skipping malformed row: {e}", self.path.display()),
            }
        }
        Ok(rows)
    }

    /// The most recent summaries, newest first.
    pub fn fetch_recent(&self, limit: usize) -> Result<Vec<WindowSummary>, SinkError> {
        let mut rows = self.read_all()?;
        rows.reverse();
        rows.truncate(limit);
        Ok(rows)
    }

    /// Summaries with `epoch_seconds` inside `[start, end]`, oldest first.
    pub fn query_range(&self, start: i64, end: i64) -> Result<Vec<WindowSummary>, SinkError> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|s| s.epoch_seconds >= start && s.epoch_seconds <= end)
            .collect())
    }

    /// Number of stored summaries.
    pub fn count(&self) -> Result<usize, SinkError> {
        Ok(self.read_all()?.len())
    }
}

impl MetricsSink for JsonlStore {
    fn append(&mut self, summary: &WindowSummary) -> Result<(), SinkError> {
        let mut line =
            serde_json::to_string(summary).map_err(|e| SinkError::Serialize(e.to_string()))?;
        line.push('\n');
        self.file
            .write_all(line.as_bytes())
            .map_err(|e| SinkError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("blinkwatch-store-{name}.jsonl"));
        std::fs::remove_file(&path).ok();
        path
    }

    fn summary(epoch: i64, blinks: u32) -> WindowSummary {
        WindowSummary {
            epoch_seconds: epoch,
            blink_count: blinks,
            avg_cpu_percent: 20.0,
            mem_percent: 10.0,
        }
    }

    #[test]
    fn test_append_and_read_back() {
        let path = temp_store("roundtrip");
        let mut store = JsonlStore::open(&path).unwrap();

        store.append(&summary(100, 1)).unwrap();
        store.append(&summary(101, 0)).unwrap();

        let rows = store.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], summary(100, 1));
        assert_eq!(rows[1].epoch_seconds, 101);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_fetch_recent_is_newest_first() {
        let path = temp_store("recent");
        let mut store = JsonlStore::open(&path).unwrap();

        for epoch in 100..110 {
            store.append(&summary(epoch, 0)).unwrap();
        }

        let recent = store.fetch_recent(3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].epoch_seconds, 109);
        assert_eq!(recent[2].epoch_seconds, 107);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_query_range_bounds_are_inclusive() {
        let path = temp_store("range");
        let mut store = JsonlStore::open(&path).unwrap();

        for epoch in [100, 105, 110, 115] {
            store.append(&summary(epoch, 0)).unwrap();
        }

        let rows = store.query_range(105, 110).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].epoch_seconds, 105);
        assert_eq!(rows[1].epoch_seconds, 110);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let path = temp_store("malformed");
        let mut store = JsonlStore::open(&path).unwrap();
        store.append(&summary(100, 2)).unwrap();

        // Simulate an interrupted write.
        store.file.write_all(b"{\"epoch_seco").unwrap();
        drop(store);

        let store = JsonlStore::open(&path).unwrap();
        let rows = store.read_all().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].blink_count, 2);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_reopen_appends_rather_than_truncates() {
        let path = temp_store("reopen");
        {
            let mut store = JsonlStore::open(&path).unwrap();
            store.append(&summary(100, 1)).unwrap();
        }
        {
            let mut store = JsonlStore::open(&path).unwrap();
            store.append(&summary(101, 2)).unwrap();
        }

        let store = JsonlStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 2);

        std::fs::remove_file(path).ok();
    }
}
