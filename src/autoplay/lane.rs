//! Per-lane debounce state

use std::time::{Duration, Instant};

/// Debounce bookkeeping for a single lane
#[derive(Debug, Clone)]
pub struct LaneState {
    /// When this lane last fired (loop start until the first press)
    last_key_press_time: Instant,
    /// Minimum time between two fires
    debounce: Duration,
}

/// Outcome of updating a lane with one frame's classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneUpdate {
    /// Lane fired this frame
    pub fired: bool,
    /// Lane was inside its debounce window when the frame was taken
    pub debounced: bool,
}

impl LaneState {
    /// Create a lane whose debounce window starts at `start`
    pub fn new(start: Instant, debounce: Duration) -> Self {
        Self {
            last_key_press_time: start,
            debounce,
        }
    }

    pub fn last_key_press_time(&self) -> Instant {
        self.last_key_press_time
    }

    /// Whether `now` is still inside the debounce window
    pub fn is_debounced(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_key_press_time) < self.debounce
    }

    /// Feed one frame's classification.
    ///
    /// The lane fires when a note is present and strictly more than the
    /// debounce window has passed since the previous fire. The fire time is
    /// recorded immediately, not when the press leaves the delay buffer.
    pub fn update(&mut self, active: bool, now: Instant) -> LaneUpdate {
        let elapsed = now.saturating_duration_since(self.last_key_press_time);
        let debounced = elapsed < self.debounce;
        let fired = active && elapsed > self.debounce;
        if fired {
            self.last_key_press_time = now;
        }
        LaneUpdate { fired, debounced }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEBOUNCE: Duration = Duration::from_millis(250);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_no_fire_inside_initial_window() {
        let start = Instant::now();
        let mut lane = LaneState::new(start, DEBOUNCE);
        assert!(!lane.update(true, start + ms(100)).fired);
        assert!(lane.update(true, start + ms(251)).fired);
    }

    #[test]
    fn test_exact_window_does_not_fire() {
        let start = Instant::now();
        let mut lane = LaneState::new(start, DEBOUNCE);
        let update = lane.update(true, start + DEBOUNCE);
        assert!(!update.fired);
        assert!(!update.debounced);
    }

    #[test]
    fn test_inactive_never_fires() {
        let start = Instant::now();
        let mut lane = LaneState::new(start, DEBOUNCE);
        assert!(!lane.update(false, start + ms(1000)).fired);
        assert_eq!(lane.last_key_press_time(), start);
    }

    #[test]
    fn test_debounce_monotonicity() {
        let start = Instant::now();
        let mut lane = LaneState::new(start, DEBOUNCE);

        let first = start + ms(300);
        assert!(lane.update(true, first).fired);

        // Every frame up to and including the window edge must not fire
        for step in 1..=50 {
            let update = lane.update(true, first + ms(step * 5));
            assert!(!update.fired, "fired again after {}ms", step * 5);
            assert_eq!(update.debounced, step * 5 < 250, "at {}ms", step * 5);
        }
        assert_eq!(lane.last_key_press_time(), first);

        assert!(lane.update(true, first + ms(251)).fired);
    }

    #[test]
    fn test_debounced_reported_before_update() {
        let start = Instant::now();
        let mut lane = LaneState::new(start, DEBOUNCE);
        let update = lane.update(true, start + ms(400));
        // The firing frame itself was outside the window
        assert!(update.fired);
        assert!(!update.debounced);
        assert!(lane.is_debounced(start + ms(401)));
    }
}
