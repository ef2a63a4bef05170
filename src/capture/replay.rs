//! JSONL frame-trace replay.
//!
//! A trace is one JSON object per line recording a single frame's EAR
//! observation: `{"ear":0.27}`, or `{"ear":null}` where no face was
//! found. Traces are the agent's offline ingestion path; recording them
//! is the job of whatever ran the camera.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capture::types::Frame;
use crate::capture::FrameSource;

/// One line of a frame trace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TraceRecord {
    /// EAR observation for the frame; `None` when no face was found.
    pub ear: Option<f64>,
}

/// Errors opening a trace file.
#[derive(Debug)]
pub enum TraceError {
    Io(String),
}

impl std::fmt::Display for TraceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TraceError::Io(msg) => write!(f, "Failed to open trace: {msg}"),
        }
    }
}

impl std::error::Error for TraceError {}

/// Replays a JSONL frame trace as a capture source.
///
/// Malformed lines are skipped with a warning; blank lines are ignored.
/// A read failure ends the stream the same way exhaustion does.
pub struct ReplaySource {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    next_index: u64,
}

impl ReplaySource {
    /// Open a trace file for replay.
    pub fn open(path: &Path) -> Result<Self, TraceError> {
        let file = File::open(path)
            .map_err(|e| TraceError::Io(format!("{}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            lines: Some(BufReader::new(file).lines()),
            next_index: 0,
        })
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let line = match self.lines.as_mut()?.next() {
                None => {
                    self.lines = None;
                    return None;
                }
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    warn!(
                        "{}: read failed after frame {}: {e}",
                        self.path.display(),
                        self.next_index
                    );
                    self.lines = None;
                    return None;
                }
            };

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<TraceRecord>(trimmed) {
                Ok(record) => {
                    let index = self.next_index;
                    self.next_index += 1;
                    return Some(match record.ear {
                        Some(value) => Frame::with_ear(index, value),
                        None => Frame::without_face(index),
                    });
                }
                Err(e) => {
                    warn!("{}: skipping malformed trace line: {e}", self.path.display());
                }
            }
        }
    }

    fn release(&mut self) {
        self.lines = None;
    }
}
