//! Blinkwatch Agent - Blink-rate and system-load monitoring for webcam
//! wellness tools.
//!
//! This library turns a stream of per-frame eye-aspect-ratio readings into
//! periodic summaries of blink activity and system load, the core of a
//! screen-break reminder that watches how often you blink.
//!
//! # Privacy Guarantees
//!
//! - **No pixels**: frames enter the pipeline as eye-aspect-ratio scalars
//!   or facial landmark points, never image data
//! - **No per-frame storage**: readings fold into counters and a bounded
//!   rolling buffer as they arrive
//! - **Aggregates only**: a stored record carries one blink count and two
//!   load readings per window
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      Blinkwatch Agent                      │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │   Capture   │──▶│  Analyzer   │──▶│    Sink     │       │
//! │  │  (frames)   │   │  (windows)  │   │   (JSONL)   │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                 ▲                                │
//! │         ▼                 │                                │
//! │  ┌─────────────┐   ┌─────────────┐                         │
//! │  │   Session   │   │ Load probe  │                         │
//! │  │    stats    │   │  (sysinfo)  │                         │
//! │  └─────────────┘   └─────────────┘                         │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use blinkwatch_agent::stats::create_shared_stats;
//! use blinkwatch_agent::{BlinkMonitor, FixedProbe, MemorySink, ScriptedSource};
//!
//! // Thirty open-eyed frames fill exactly one window
//! let sink = MemorySink::new();
//! let mut monitor = BlinkMonitor::new(
//!     Box::new(ScriptedSource::from_ears(vec![Some(0.3); 30])),
//!     Box::new(FixedProbe::new(12.0, 4.0)),
//!     Box::new(sink.clone()),
//!     create_shared_stats(),
//! );
//! monitor.run();
//!
//! assert_eq!(sink.count(), 1);
//! ```

pub mod analyzer;
pub mod capture;
pub mod config;
pub mod probe;
pub mod session;
pub mod sink;
pub mod stats;

// Re-export key types at crate root for convenience
pub use analyzer::{BlinkTracker, FaceLandmarks, Point, WindowAggregator, WindowSummary};
pub use capture::{Frame, FrameSignal, FrameSource, ReplaySource, ScriptedSource, ThreadedSource};
pub use config::{Config, DetectorConfig, WindowConfig};
pub use probe::{FixedProbe, LoadProbe, SystemProbe};
pub use session::{BlinkMonitor, LoopState};
pub use sink::{JsonlStore, MemorySink, MetricsSink, SinkError};
pub use stats::{SessionStats, SharedSessionStats, StatsSnapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
