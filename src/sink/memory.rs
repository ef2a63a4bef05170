//! In-memory sink for tests and demos.

use std::sync::{Arc, Mutex};

use crate::analyzer::WindowSummary;
use crate::sink::{MetricsSink, SinkError};

/// Collects summaries into a shared vector.
///
/// Clones share the same backing storage, so a test can keep one handle
/// while the driver owns the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    summaries: Arc<Mutex<Vec<WindowSummary>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything appended so far, in order.
    pub fn summaries(&self) -> Vec<WindowSummary> {
        self.summaries.lock().expect("sink lock poisoned").clone()
    }

    /// Number of appended summaries.
    pub fn count(&self) -> usize {
        self.summaries.lock().expect("sink lock poisoned").len()
    }
}

impl MetricsSink for MemorySink {
    fn append(&mut self, summary: &WindowSummary) -> Result<(), SinkError> {
        self.summaries
            .lock()
            .map_err(|_| SinkError::Io("sink lock poisoned".into()))?
            .push(summary.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_storage() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();

        let summary = WindowSummary {
            epoch_seconds: 100,
            blink_count: 3,
            avg_cpu_percent: 15.0,
            mem_percent: 9.0,
        };
        writer.append(&summary).unwrap();

        assert_eq!(sink.count(), 1);
        assert_eq!(sink.summaries()[0], summary);
    }
}
