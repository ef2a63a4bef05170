//! Blink detection over a stream of eye-aspect-ratio readings.
//!
//! A blink registers on the open-to-closed transition of a thresholded EAR
//! signal. The signal is noisy while the eyelid moves, so a cooldown of
//! observed frames must elapse before another blink may register.

/// EAR readings below this value count as a closed eye.
pub const DEFAULT_EAR_CLOSE_THRESHOLD: f64 = 0.25;

/// Observed frames that must pass after a blink before the next one.
pub const DEFAULT_BLINK_COOLDOWN_FRAMES: u32 = 10;

/// Debounced blink counter fed one EAR reading per observed frame.
///
/// Frames where no face was found must not call `observe` at all - the
/// cooldown advances per observed frame, not per wall-clock frame.
#[derive(Debug, Clone)]
pub struct BlinkTracker {
    close_threshold: f64,
    cooldown_frames: u32,
    is_closed: bool,
    cooldown_remaining: u32,
    blink_count: u32,
}

impl BlinkTracker {
    /// Create a tracker with the given threshold and cooldown length.
    pub fn new(close_threshold: f64, cooldown_frames: u32) -> Self {
        Self {
            close_threshold,
            cooldown_frames,
            is_closed: false,
            cooldown_remaining: 0,
            blink_count: 0,
        }
    }

    /// Feed one EAR reading.
    ///
    /// A blink registers when the eye transitions to closed while no
    /// cooldown is pending. A reading at or above the threshold always
    /// reads as open, including the threshold itself.
    pub fn observe(&mut self, ear: f64) {
        if ear < self.close_threshold && !self.is_closed && self.cooldown_remaining == 0 {
            self.is_closed = true;
            self.blink_count += 1;
            self.cooldown_remaining = self.cooldown_frames;
        } else if ear >= self.close_threshold {
            self.is_closed = false;
        }

        // Ticks on every observed frame, including the one that armed it.
        if self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
    }

    /// Read and clear the running blink count.
    pub fn take_blink_count(&mut self) -> u32 {
        std::mem::take(&mut self.blink_count)
    }

    /// Current debounced eye state.
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }
}

impl Default for BlinkTracker {
    fn default() -> Self {
        Self::new(DEFAULT_EAR_CLOSE_THRESHOLD, DEFAULT_BLINK_COOLDOWN_FRAMES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_on_close_transition() {
        let mut tracker = BlinkTracker::default();
        tracker.observe(0.30);
        assert!(!tracker.is_closed());

        tracker.observe(0.10);
        assert!(tracker.is_closed());
        assert_eq!(tracker.take_blink_count(), 1);
    }

    #[test]
    fn test_constant_closure_counts_once() {
        let mut tracker = BlinkTracker::default();
        for _ in 0..30 {
            tracker.observe(0.10);
        }
        // The eye never re-opens, so a held closure is a single blink.
        assert_eq!(tracker.take_blink_count(), 1);
    }

    #[test]
    fn test_threshold_reading_is_open() {
        let mut tracker = BlinkTracker::default();
        tracker.observe(DEFAULT_EAR_CLOSE_THRESHOLD);
        assert!(!tracker.is_closed());
        assert_eq!(tracker.take_blink_count(), 0);

        tracker.observe(0.10);
        assert!(tracker.is_closed());
        tracker.observe(DEFAULT_EAR_CLOSE_THRESHOLD);
        assert!(!tracker.is_closed());
    }

    #[test]
    fn test_cooldown_blocks_recount() {
        let mut tracker = BlinkTracker::default();
        tracker.observe(0.10);
        assert_eq!(tracker.blink_count, 1);

        // Dip-open-dip right after the blink: still inside the cooldown.
        tracker.observe(0.15);
        tracker.observe(0.35);
        tracker.observe(0.15);
        assert_eq!(tracker.blink_count, 1);

        // Six more open frames run the cooldown out (10 ticks total).
        for _ in 0..6 {
            tracker.observe(0.35);
        }
        assert_eq!(tracker.cooldown_remaining, 0);

        // The same dip-open-dip now registers exactly one more blink.
        tracker.observe(0.15);
        tracker.observe(0.35);
        tracker.observe(0.15);
        assert_eq!(tracker.take_blink_count(), 2);
    }

    #[test]
    fn test_cooldown_caps_blink_rate() {
        // Worst-case flutter: the signal crosses the threshold every frame.
        let mut tracker = BlinkTracker::default();
        for frame in 0..21 {
            let ear = if frame % 2 == 0 { 0.10 } else { 0.35 };
            tracker.observe(ear);
        }
        // Registered at observed frames 1, 11 and 21: one blink per
        // cooldown-length run of frames, never faster.
        assert_eq!(tracker.take_blink_count(), 3);
    }

    #[test]
    fn test_take_resets_count() {
        let mut tracker = BlinkTracker::default();
        tracker.observe(0.10);
        assert_eq!(tracker.take_blink_count(), 1);
        assert_eq!(tracker.take_blink_count(), 0);
    }

    #[test]
    fn test_custom_threshold_and_cooldown() {
        let mut tracker = BlinkTracker::new(0.5, 3);
        tracker.observe(0.45);
        assert_eq!(tracker.blink_count, 1);

        tracker.observe(0.60);
        tracker.observe(0.45);
        // The second dip lands one frame inside the cooldown.
        assert_eq!(tracker.blink_count, 1);

        tracker.observe(0.60);
        tracker.observe(0.45);
        assert_eq!(tracker.take_blink_count(), 2);
    }
}
