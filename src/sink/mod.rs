//! Persistence of closed window summaries.
//!
//! The driver hands each closed window to a sink exactly once. Appends
//! are fire-and-forget: a failed append is logged and the summary is
//! dropped, never buffered for retry.

pub mod jsonl;
pub mod memory;

// Re-export commonly used types
pub use jsonl::{JsonlStore, DEFAULT_RECENT_LIMIT};
pub use memory::MemorySink;

use crate::analyzer::WindowSummary;

/// Destination for closed window summaries.
///
/// Implementations must preserve append order; stored `epoch_seconds`
/// values are non-decreasing because windows close in sequence.
pub trait MetricsSink {
    fn append(&mut self, summary: &WindowSummary) -> Result<(), SinkError>;
}

/// Errors from appending or reading stored summaries.
#[derive(Debug)]
pub enum SinkError {
    Io(String),
    Serialize(String),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "Sink IO error: {e}"),
            SinkError::Serialize(e) => write!(f, "Sink serialize error: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}
