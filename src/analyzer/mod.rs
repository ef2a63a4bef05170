//! Blink and load analysis for the Blinkwatch agent.
//!
//! This module contains:
//! - Eye-aspect-ratio geometry over face landmarks
//! - The debounced blink state machine
//! - Window aggregation of blink counts and load readings

pub mod blink;
pub mod ear;
pub mod window;

// Re-export commonly used types
pub use blink::{BlinkTracker, DEFAULT_BLINK_COOLDOWN_FRAMES, DEFAULT_EAR_CLOSE_THRESHOLD};
pub use ear::{average_ear, extract_ear, eye_aspect_ratio, FaceLandmarks, Point};
pub use window::{
    WindowAggregator, WindowSummary, DEFAULT_CPU_SAMPLE_CAPACITY, DEFAULT_FRAMES_PER_WINDOW,
};
