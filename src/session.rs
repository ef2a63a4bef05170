//! The monitoring session frame loop.
//!
//! Pulls frames from a capture source, reduces each to an EAR
//! observation, feeds the blink tracker and the window aggregator, and
//! appends closed windows to the metrics sink. Collaborator conditions
//! are absorbed here: an exhausted source stops the loop, a frame
//! without a face skips the blink observation, and a failed append is
//! logged and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::analyzer::{extract_ear, BlinkTracker, WindowAggregator};
use crate::capture::FrameSource;
use crate::probe::LoadProbe;
use crate::sink::MetricsSink;
use crate::stats::SharedSessionStats;

/// Driver state over the lifetime of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Frames are flowing.
    Running,
    /// The source ran dry or a stop was requested; capture resources
    /// are being released.
    Stopping,
    /// Terminal.
    Stopped,
}

/// One monitoring session wired to its collaborators.
///
/// The monitor owns the tracker and the aggregator for the session's
/// lifetime; everything runs on the caller's thread, so frames reach the
/// blink state machine in strict capture order. A stop flag is checked
/// once per iteration and the current frame's bookkeeping always
/// completes before the loop winds down.
pub struct BlinkMonitor {
    source: Box<dyn FrameSource>,
    probe: Box<dyn LoadProbe>,
    sink: Box<dyn MetricsSink>,
    tracker: BlinkTracker,
    aggregator: WindowAggregator,
    stats: SharedSessionStats,
    stop_flag: Arc<AtomicBool>,
    state: LoopState,
}

impl BlinkMonitor {
    /// Wire a session with default blink and window tuning.
    pub fn new(
        source: Box<dyn FrameSource>,
        probe: Box<dyn LoadProbe>,
        sink: Box<dyn MetricsSink>,
        stats: SharedSessionStats,
    ) -> Self {
        Self {
            source,
            probe,
            sink,
            tracker: BlinkTracker::default(),
            aggregator: WindowAggregator::default(),
            stats,
            stop_flag: Arc::new(AtomicBool::new(false)),
            state: LoopState::Running,
        }
    }

    /// Replace the default blink and window tuning.
    pub fn with_tuning(mut self, tracker: BlinkTracker, aggregator: WindowAggregator) -> Self {
        self.tracker = tracker;
        self.aggregator = aggregator;
        self
    }

    /// Flag that stops the loop at the next iteration boundary. Hand
    /// this to a Ctrl-C handler or another thread.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Current driver state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Run the session to completion.
    ///
    /// Returns when the source is exhausted or a stop was requested.
    /// The capture source is released on the way out; a window left
    /// partially filled is discarded, matching the per-window contract.
    pub fn run(&mut self) {
        self.state = LoopState::Running;
        info!("monitoring session started");

        while self.state == LoopState::Running {
            self.step();

            if self.state == LoopState::Running && self.stop_flag.load(Ordering::SeqCst) {
                debug!("stop requested");
                self.state = LoopState::Stopping;
            }
        }

        let leftover = self.aggregator.frame_count();
        if leftover > 0 {
            debug!("discarding partial window of {leftover} frames");
        }

        self.source.release();
        self.state = LoopState::Stopped;
        info!("monitoring session stopped");
    }

    /// Process one frame: observe, record, and close the window when due.
    fn step(&mut self) {
        let Some(frame) = self.source.next_frame() else {
            debug!("capture exhausted");
            self.state = LoopState::Stopping;
            return;
        };

        self.stats.record_frame();

        // A frame without a face contributes no EAR observation; the
        // blink cooldown does not tick for it either.
        match extract_ear(&frame) {
            Some(ear) => self.tracker.observe(ear),
            None => self.stats.record_frame_without_face(),
        }

        let cpu = self.probe.cpu_percent();
        let mem = self.probe.mem_percent();
        self.aggregator.record_frame(cpu, mem);

        if self.aggregator.is_window_complete() {
            let summary = self.aggregator.close_window(&mut self.tracker);
            self.stats.record_blinks(u64::from(summary.blink_count));
            debug!(
                "window closed: {} blinks, cpu {:.1}%, mem {:.1}%",
                summary.blink_count, summary.avg_cpu_percent, summary.mem_percent
            );

            match self.sink.append(&summary) {
                Ok(()) => self.stats.record_window_closed(),
                Err(e) => {
                    warn!("dropping window summary: {e}");
                    self.stats.record_sink_failure();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::WindowSummary;
    use crate::capture::{Frame, ScriptedSource};
    use crate::probe::FixedProbe;
    use crate::sink::{MemorySink, SinkError};
    use crate::stats::create_shared_stats;

    /// Sink that refuses every append.
    struct FailingSink;

    impl MetricsSink for FailingSink {
        fn append(&mut self, _summary: &WindowSummary) -> Result<(), SinkError> {
            Err(SinkError::Io("disk gone".into()))
        }
    }

    /// Wraps a source and records whether it was released.
    struct ReleaseProbe {
        inner: ScriptedSource,
        released: Arc<AtomicBool>,
    }

    impl FrameSource for ReleaseProbe {
        fn next_frame(&mut self) -> Option<Frame> {
            self.inner.next_frame()
        }

        fn release(&mut self) {
            self.released.store(true, Ordering::SeqCst);
            self.inner.release();
        }
    }

    fn monitor_over(
        ears: Vec<Option<f64>>,
        sink: Box<dyn MetricsSink>,
        stats: SharedSessionStats,
    ) -> BlinkMonitor {
        BlinkMonitor::new(
            Box::new(ScriptedSource::from_ears(ears)),
            Box::new(FixedProbe::new(20.0, 10.0)),
            sink,
            stats,
        )
    }

    fn blink_scenario() -> Vec<Option<f64>> {
        let mut ears = vec![Some(0.30); 9];
        ears.extend(vec![Some(0.10); 4]);
        ears.extend(vec![Some(0.30); 17]);
        ears
    }

    #[test]
    fn test_single_window_end_to_end() {
        let sink = MemorySink::new();
        let stats = create_shared_stats();
        let mut monitor = monitor_over(blink_scenario(), Box::new(sink.clone()), stats.clone());

        monitor.run();

        assert_eq!(monitor.state(), LoopState::Stopped);
        let summaries = sink.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].blink_count, 1);
        assert_eq!(summaries[0].avg_cpu_percent, 20.0);
        assert_eq!(summaries[0].mem_percent, 10.0);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_processed, 30);
        assert_eq!(snapshot.windows_closed, 1);
        assert_eq!(snapshot.blinks_counted, 1);
    }

    #[test]
    fn test_exhaustion_stops_before_a_window_completes() {
        let sink = MemorySink::new();
        let stats = create_shared_stats();
        let mut monitor = monitor_over(
            vec![Some(0.30); 10],
            Box::new(sink.clone()),
            stats.clone(),
        );

        monitor.run();

        assert_eq!(monitor.state(), LoopState::Stopped);
        assert_eq!(sink.count(), 0);
        assert_eq!(stats.snapshot().frames_processed, 10);
    }

    #[test]
    fn test_faceless_frames_still_fill_the_window() {
        let sink = MemorySink::new();
        let stats = create_shared_stats();
        let mut monitor = monitor_over(vec![None; 30], Box::new(sink.clone()), stats.clone());

        monitor.run();

        let summaries = sink.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].blink_count, 0);
        assert_eq!(stats.snapshot().frames_without_face, 30);
    }

    #[test]
    fn test_faceless_frames_do_not_tick_the_cooldown() {
        // One blink, nine faceless frames, then a reopen and a fresh dip.
        // Had the gap counted toward the cooldown, the dip would register
        // a second blink.
        let mut ears = vec![Some(0.10)];
        ears.extend(vec![None; 9]);
        ears.push(Some(0.35));
        ears.push(Some(0.10));

        let sink = MemorySink::new();
        let mut monitor = monitor_over(ears, Box::new(sink.clone()), create_shared_stats());
        monitor = monitor.with_tuning(BlinkTracker::default(), WindowAggregator::new(12, 30));

        monitor.run();

        let summaries = sink.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].blink_count, 1);
    }

    #[test]
    fn test_sink_failure_is_not_fatal() {
        let stats = create_shared_stats();
        let mut monitor = monitor_over(
            vec![Some(0.30); 60],
            Box::new(FailingSink),
            stats.clone(),
        );

        monitor.run();

        assert_eq!(monitor.state(), LoopState::Stopped);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frames_processed, 60);
        assert_eq!(snapshot.sink_failures, 2);
        assert_eq!(snapshot.windows_closed, 0);
    }

    #[test]
    fn test_stop_flag_finishes_the_current_frame() {
        let stats = create_shared_stats();
        let mut monitor = monitor_over(
            vec![Some(0.30); 100],
            Box::new(MemorySink::new()),
            stats.clone(),
        );

        monitor.stop_handle().store(true, Ordering::SeqCst);
        monitor.run();

        assert_eq!(monitor.state(), LoopState::Stopped);
        // The flag is honored at the iteration boundary, after the
        // frame in flight finished its bookkeeping.
        assert_eq!(stats.snapshot().frames_processed, 1);
    }

    #[test]
    fn test_source_released_on_stop() {
        let released = Arc::new(AtomicBool::new(false));
        let source = ReleaseProbe {
            inner: ScriptedSource::from_ears(vec![Some(0.30); 5]),
            released: released.clone(),
        };

        let mut monitor = BlinkMonitor::new(
            Box::new(source),
            Box::new(FixedProbe::new(0.0, 0.0)),
            Box::new(MemorySink::new()),
            create_shared_stats(),
        );
        monitor.run();

        assert_eq!(monitor.state(), LoopState::Stopped);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_partial_window_is_discarded() {
        let sink = MemorySink::new();
        let mut monitor = monitor_over(
            vec![Some(0.30); 40],
            Box::new(sink.clone()),
            create_shared_stats(),
        );

        monitor.run();

        // 30 frames closed one window; the last 10 never formed another.
        assert_eq!(sink.count(), 1);
    }
}
