//! Session statistics for the Blinkwatch agent.
//!
//! One `SessionStats` is created per process and handed to the frame
//! loop at construction; every component reports through that handle
//! rather than a process-global logger. Counters can persist across
//! sessions so `status` shows cumulative totals.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Counters for the current monitoring session.
#[derive(Debug)]
pub struct SessionStats {
    /// Frames pulled from the capture source
    frames_processed: AtomicU64,
    /// Frames where no face was found
    frames_without_face: AtomicU64,
    /// Blinks that reached a closed window
    blinks_counted: AtomicU64,
    /// Windows closed into the sink
    windows_closed: AtomicU64,
    /// Window summaries lost to sink failures
    sink_failures: AtomicU64,
    /// Identifier for this process's session
    session_id: Uuid,
    /// Session start time
    session_start: DateTime<Utc>,
    /// Path for persisting counters
    persist_path: Option<PathBuf>,
}

impl SessionStats {
    /// Create fresh session stats.
    pub fn new() -> Self {
        Self {
            frames_processed: AtomicU64::new(0),
            frames_without_face: AtomicU64::new(0),
            blinks_counted: AtomicU64::new(0),
            windows_closed: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            session_id: Uuid::new_v4(),
            session_start: Utc::now(),
            persist_path: None,
        }
    }

    /// Create session stats that continue persisted counters.
    pub fn with_persistence(path: PathBuf) -> Self {
        let mut stats = Self::new();
        stats.persist_path = Some(path);

        // Try to load existing counters
        if let Err(e) = stats.load() {
            eprintln!("Note: Could not load previous session stats: {e}");
        }

        stats
    }

    /// Record one frame pulled from the source.
    pub fn record_frame(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame where no face was found.
    pub fn record_frame_without_face(&self) {
        self.frames_without_face.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the blinks of a closed window.
    pub fn record_blinks(&self, count: u64) {
        self.blinks_counted.fetch_add(count, Ordering::Relaxed);
    }

    /// Record a window closed into the sink.
    pub fn record_window_closed(&self) {
        self.windows_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a summary lost to a sink failure.
    pub fn record_sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_without_face: self.frames_without_face.load(Ordering::Relaxed),
            blinks_counted: self.blinks_counted.load(Ordering::Relaxed),
            windows_closed: self.windows_closed.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            session_id: self.session_id,
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds() as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.snapshot();
        format!(
            "Session Statistics:\n\
             - Frames processed: {}\n\
             - Frames without a face: {}\n\
             - Blinks counted: {}\n\
             - Windows stored: {}\n\
             - Sink failures: {}\n\
             - Session duration: {} seconds",
            stats.frames_processed,
            stats.frames_without_face,
            stats.blinks_counted,
            stats.windows_closed,
            stats.sink_failures,
            stats.session_duration_secs
        )
    }

    /// Save counters to disk.
    pub fn save(&self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let stats = self.snapshot();
            let persisted = PersistedStats {
                frames_processed: stats.frames_processed,
                frames_without_face: stats.frames_without_face,
                blinks_counted: stats.blinks_counted,
                windows_closed: stats.windows_closed,
                sink_failures: stats.sink_failures,
                last_updated: Utc::now(),
            };

            let json = serde_json::to_string_pretty(&persisted).map_err(std::io::Error::other)?;

            std::fs::write(path, json)?;
        }
        Ok(())
    }

    /// Load counters from disk.
    fn load(&mut self) -> Result<(), std::io::Error> {
        if let Some(ref path) = self.persist_path {
            if path.exists() {
                let content = std::fs::read_to_string(path)?;
                let persisted: PersistedStats =
                    serde_json::from_str(&content).map_err(std::io::Error::other)?;

                self.frames_processed
                    .store(persisted.frames_processed, Ordering::Relaxed);
                self.frames_without_face
                    .store(persisted.frames_without_face, Ordering::Relaxed);
                self.blinks_counted
                    .store(persisted.blinks_counted, Ordering::Relaxed);
                self.windows_closed
                    .store(persisted.windows_closed, Ordering::Relaxed);
                self.sink_failures
                    .store(persisted.sink_failures, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.frames_processed.store(0, Ordering::Relaxed);
        self.frames_without_face.store(0, Ordering::Relaxed);
        self.blinks_counted.store(0, Ordering::Relaxed);
        self.windows_closed.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of session statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub frames_processed: u64,
    pub frames_without_face: u64,
    pub blinks_counted: u64,
    pub windows_closed: u64,
    pub sink_failures: u64,
    pub session_id: Uuid,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Counter format for persistence.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedStats {
    frames_processed: u64,
    frames_without_face: u64,
    blinks_counted: u64,
    windows_closed: u64,
    sink_failures: u64,
    last_updated: DateTime<Utc>,
}

/// Thread-safe shared session stats.
pub type SharedSessionStats = Arc<SessionStats>;

/// Create new shared session stats.
pub fn create_shared_stats() -> SharedSessionStats {
    Arc::new(SessionStats::new())
}

/// Create new shared session stats with persistence.
pub fn create_shared_stats_with_persistence(path: PathBuf) -> SharedSessionStats {
    Arc::new(SessionStats::with_persistence(path))
}
