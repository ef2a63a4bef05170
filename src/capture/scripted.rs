//! In-memory frame source for demos and tests.

use std::collections::VecDeque;

use crate::capture::types::Frame;
use crate::capture::FrameSource;

/// Serves a pre-built sequence of frames in order.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    frames: VecDeque<Frame>,
    released: bool,
}

impl ScriptedSource {
    /// Build a source from optional EAR values, one per frame. `None`
    /// stands for a frame where no face was found.
    pub fn from_ears(ears: Vec<Option<f64>>) -> Self {
        let frames = ears
            .into_iter()
            .enumerate()
            .map(|(index, ear)| match ear {
                Some(value) => Frame::with_ear(index as u64, value),
                None => Frame::without_face(index as u64),
            })
            .collect();
        Self {
            frames,
            released: false,
        }
    }

    /// Build a source from fully-formed frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
            released: false,
        }
    }

    /// Whether the source has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.released {
            return None;
        }
        self.frames.pop_front()
    }

    fn release(&mut self) {
        self.released = true;
        self.frames.clear();
    }
}
