//! Eye-aspect-ratio geometry over 68-point face landmarks.
//!
//! EAR relates the vertical eyelid distances to the horizontal eye span:
//! `(|p1-p5| + |p2-p4|) / (2 |p0-p3|)` for the six landmarks of one eye.
//! Open eyes sit around 0.3; the ratio collapses toward zero as the lids
//! close.

use serde::{Deserialize, Serialize};

use crate::capture::{Frame, FrameSignal};

/// Number of points in the landmark layout this module understands.
pub const LANDMARK_COUNT: usize = 68;

/// Horizontal eye spans below this are treated as degenerate geometry.
const MIN_EYE_SPAN: f64 = 1e-3;

/// Right-eye indices in the 68-point layout.
const RIGHT_EYE: std::ops::Range<usize> = 36..42;

/// Left-eye indices in the 68-point layout.
const LEFT_EYE: std::ops::Range<usize> = 42..48;

/// A 2D landmark position in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// A face landmark set in the standard 68-point ordering.
///
/// The point count is checked on every construction path, including
/// deserialization, so the eye accessors can slice unconditionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFaceLandmarks")]
pub struct FaceLandmarks {
    points: Vec<Point>,
}

impl FaceLandmarks {
    /// Wrap a 68-point landmark set. Any other length is rejected.
    pub fn from_points(points: Vec<Point>) -> Option<Self> {
        (points.len() == LANDMARK_COUNT).then_some(Self { points })
    }

    /// The six landmarks of the right eye.
    pub fn right_eye(&self) -> &[Point] {
        &self.points[RIGHT_EYE]
    }

    /// The six landmarks of the left eye.
    pub fn left_eye(&self) -> &[Point] {
        &self.points[LEFT_EYE]
    }
}

/// Wire form of [`FaceLandmarks`], revalidated on the way in.
#[derive(Deserialize)]
struct RawFaceLandmarks {
    points: Vec<Point>,
}

impl TryFrom<RawFaceLandmarks> for FaceLandmarks {
    type Error = String;

    fn try_from(raw: RawFaceLandmarks) -> Result<Self, Self::Error> {
        let count = raw.points.len();
        FaceLandmarks::from_points(raw.points)
            .ok_or_else(|| format!("expected {LANDMARK_COUNT} landmarks, got {count}"))
    }
}

/// EAR for one eye given its six landmarks in standard order.
///
/// Degenerate geometry (no horizontal span) reads as fully closed.
pub fn eye_aspect_ratio(eye: &[Point]) -> f64 {
    debug_assert_eq!(eye.len(), 6);

    let vertical_a = eye[1].distance(&eye[5]);
    let vertical_b = eye[2].distance(&eye[4]);
    let horizontal = eye[0].distance(&eye[3]);

    if horizontal < MIN_EYE_SPAN {
        return 0.0;
    }

    (vertical_a + vertical_b) / (2.0 * horizontal)
}

/// Mean EAR across both eyes.
pub fn average_ear(landmarks: &FaceLandmarks) -> f64 {
    let left = eye_aspect_ratio(landmarks.left_eye());
    let right = eye_aspect_ratio(landmarks.right_eye());
    (left + right) / 2.0
}

/// Reduce a frame's signal to a single EAR observation, if any.
pub fn extract_ear(frame: &Frame) -> Option<f64> {
    match &frame.signal {
        FrameSignal::NoFace => None,
        FrameSignal::Ear(value) => Some(*value),
        FrameSignal::Landmarks(landmarks) => Some(average_ear(landmarks)),
    }
}
