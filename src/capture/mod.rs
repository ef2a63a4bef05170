//! Frame acquisition for the Blinkwatch agent.
//!
//! Camera integration lives upstream of this crate. This module defines
//! the source contract and the sources the agent ships: an in-memory
//! scripted sequence, a JSONL trace replayer and a threaded wrapper that
//! pumps any source through a bounded channel.

pub mod replay;
pub mod scripted;
pub mod threaded;
pub mod types;

// Re-export commonly used types
pub use replay::{ReplaySource, TraceError, TraceRecord};
pub use scripted::ScriptedSource;
pub use threaded::ThreadedSource;
pub use types::{Frame, FrameSignal};

/// A pull-based source of capture frames.
pub trait FrameSource {
    /// Pull the next frame; `None` once the stream is exhausted.
    fn next_frame(&mut self) -> Option<Frame>;

    /// Free whatever the source holds. Safe to call more than once.
    fn release(&mut self);
}
