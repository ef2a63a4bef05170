//! Threaded frame pumping through a bounded channel.
//!
//! Wraps any sendable source and pulls its frames on a worker thread. The
//! channel is bounded and single-consumer, so frames reach the analyzer
//! in strict capture order and a slow consumer backpressures the pump
//! instead of growing a queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};
use tracing::debug;

use crate::capture::types::Frame;
use crate::capture::FrameSource;

/// Queue capacity between the pump thread and the consumer.
const FRAME_QUEUE_CAPACITY: usize = 256;

/// Frame source that pulls an inner source on a worker thread.
pub struct ThreadedSource {
    receiver: Option<Receiver<Frame>>,
    running: Arc<AtomicBool>,
    pump_handle: Option<JoinHandle<()>>,
}

impl ThreadedSource {
    /// Start pumping the inner source on a worker thread.
    pub fn spawn<S>(mut inner: S) -> Self
    where
        S: FrameSource + Send + 'static,
    {
        let (sender, receiver) = bounded(FRAME_QUEUE_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));
        let pump_running = running.clone();

        let handle = thread::spawn(move || {
            while pump_running.load(Ordering::SeqCst) {
                match inner.next_frame() {
                    Some(frame) => {
                        // A failed send means the consumer dropped the
                        // receiver, which also means stop.
                        if sender.send(frame).is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            inner.release();
            pump_running.store(false, Ordering::SeqCst);
            debug!("frame pump stopped");
        });

        Self {
            receiver: Some(receiver),
            running,
            pump_handle: Some(handle),
        }
    }

    /// Whether the pump thread is still feeding the queue.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl FrameSource for ThreadedSource {
    fn next_frame(&mut self) -> Option<Frame> {
        // Buffered frames drain out even after the pump finished; the
        // channel disconnect is the end of the stream.
        self.receiver.as_ref()?.recv().ok()
    }

    fn release(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        // Dropping the receiver unblocks a pump stuck on a full queue.
        self.receiver = None;
        if let Some(handle) = self.pump_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThreadedSource {
    fn drop(&mut self) {
        self.release();
    }
}
