//! Frame types flowing from capture sources into the analyzer.
//!
//! Pixel decoding and face detection happen upstream of this crate; a
//! frame arrives here already reduced to whatever facial geometry the
//! upstream vision stage extracted from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::ear::FaceLandmarks;

/// What the upstream vision stage extracted from one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameSignal {
    /// No face was found in the frame.
    NoFace,
    /// Landmark set for the primary face.
    Landmarks(FaceLandmarks),
    /// Pre-reduced eye-aspect-ratio (recorded traces, remote detectors).
    Ear(f64),
}

/// A single captured frame, reduced to what the analyzer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Position in the capture sequence.
    pub index: u64,
    /// Timestamp when the frame was captured.
    pub captured_at: DateTime<Utc>,
    /// Facial geometry extracted upstream.
    pub signal: FrameSignal,
}

impl Frame {
    /// Frame carrying a pre-reduced EAR observation.
    pub fn with_ear(index: u64, ear: f64) -> Self {
        Self {
            index,
            captured_at: Utc::now(),
            signal: FrameSignal::Ear(ear),
        }
    }

    /// Frame carrying a full landmark set.
    pub fn with_landmarks(index: u64, landmarks: FaceLandmarks) -> Self {
        Self {
            index,
            captured_at: Utc::now(),
            signal: FrameSignal::Landmarks(landmarks),
        }
    }

    /// Frame where no face was detected.
    pub fn without_face(index: u64) -> Self {
        Self {
            index,
            captured_at: Utc::now(),
            signal: FrameSignal::NoFace,
        }
    }
}
