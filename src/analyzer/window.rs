//! Per-second aggregation of blink counts and system-load readings.
//!
//! Frames accumulate into fixed-count windows (default 30 frames, one
//! window per second at nominal frame rate). CPU readings smooth over a
//! rolling sample set that spans window boundaries; memory is
//! reported as the latest reading; the blink count is drained from the
//! tracker at each close.

use std::collections::VecDeque;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::analyzer::blink::BlinkTracker;

/// Frames per aggregation window.
pub const DEFAULT_FRAMES_PER_WINDOW: u32 = 30;

/// Capacity of the rolling CPU sample set.
pub const DEFAULT_CPU_SAMPLE_CAPACITY: usize = 30;

/// One closed window of aggregated metrics.
///
/// This is also the stored record shape: exactly these four fields, in
/// this form, end up in the metrics store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    /// Wall-clock second the window closed at.
    pub epoch_seconds: i64,
    /// Blinks registered during the window.
    pub blink_count: u32,
    /// Rolling mean CPU usage, one decimal.
    pub avg_cpu_percent: f64,
    /// Latest memory usage reading, one decimal.
    pub mem_percent: f64,
}

/// Accumulates per-frame samples and closes them into summaries.
///
/// The frame count and the blink counter are per-window; the CPU sample
/// set is not. It keeps sliding across closes so the reported average
/// stays smoothed over the last `cpu_capacity` readings regardless of
/// window alignment.
#[derive(Debug, Clone)]
pub struct WindowAggregator {
    frames_per_window: u32,
    frame_count: u32,
    cpu_samples: VecDeque<f64>,
    cpu_capacity: usize,
    last_cpu: f64,
    mem_sample: f64,
}

impl WindowAggregator {
    /// Create an aggregator with the given window length and CPU sample
    /// capacity. Zero values are bumped to one.
    pub fn new(frames_per_window: u32, cpu_capacity: usize) -> Self {
        let cpu_capacity = cpu_capacity.max(1);
        Self {
            frames_per_window: frames_per_window.max(1),
            frame_count: 0,
            cpu_samples: VecDeque::with_capacity(cpu_capacity),
            cpu_capacity,
            last_cpu: 0.0,
            mem_sample: 0.0,
        }
    }

    /// Record one frame's load readings.
    pub fn record_frame(&mut self, cpu_percent: f64, mem_percent: f64) {
        if self.cpu_samples.len() == self.cpu_capacity {
            self.cpu_samples.pop_front();
        }
        self.cpu_samples.push_back(cpu_percent);
        self.last_cpu = cpu_percent;
        self.mem_sample = mem_percent;
        self.frame_count += 1;
    }

    /// True exactly when the current window has seen a full complement of
    /// frames. The boundary is a frame count, not a wall-clock tick, so
    /// window duration drifts with the actual processing rate.
    pub fn is_window_complete(&self) -> bool {
        self.frame_count == self.frames_per_window
    }

    /// Frames recorded in the current window.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    /// Close the current window: build its summary, drain the tracker's
    /// blink count and restart the frame count.
    ///
    /// Callers must only close complete windows; anything else is a driver
    /// bug and trips the debug assertion.
    pub fn close_window(&mut self, tracker: &mut BlinkTracker) -> WindowSummary {
        debug_assert!(
            self.is_window_complete(),
            "close_window called mid-window ({} of {} frames)",
            self.frame_count,
            self.frames_per_window
        );

        let avg_cpu = if self.cpu_samples.is_empty() {
            self.last_cpu
        } else {
            self.cpu_samples.iter().sum::<f64>() / self.cpu_samples.len() as f64
        };

        let summary = WindowSummary {
            epoch_seconds: Utc::now().timestamp(),
            blink_count: tracker.take_blink_count(),
            avg_cpu_percent: round_one_decimal(avg_cpu),
            mem_percent: round_one_decimal(self.mem_sample),
        };

        self.frame_count = 0;
        summary
    }
}

impl Default for WindowAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_FRAMES_PER_WINDOW, DEFAULT_CPU_SAMPLE_CAPACITY)
    }
}

/// Round to the single decimal place stored readings carry.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
