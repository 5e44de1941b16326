//! Mock clock with controllable time advancement

use crate::platform::traits::{Clock, TimeSource};
use parking_lot::Mutex;
use std::sync::Arc;

/// Virtual clock starting at 0 ms
///
/// `delay_ms` advances virtual time instead of blocking and records the
/// requested delay.
///
/// ```
/// use eltlink::platform::mock::MockClock;
/// use eltlink::platform::Clock;
///
/// let mut clock = MockClock::new();
/// clock.delay_ms(150);
/// assert_eq!(clock.now_ms(), 150);
/// ```
#[derive(Clone, Default)]
pub struct MockClock {
    inner: Arc<Mutex<ClockState>>,
}

#[derive(Default)]
struct ClockState {
    now_ms: u64,
    delays: Vec<u64>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial(ms: u64) -> Self {
        let clock = Self::new();
        clock.set(ms);
        clock
    }

    /// Set the current time to an absolute value
    pub fn set(&self, ms: u64) {
        self.inner.lock().now_ms = ms;
    }

    /// Advance the current time without recording a delay
    pub fn advance(&self, ms: u64) {
        self.inner.lock().now_ms += ms;
    }

    /// Every delay requested so far, in order
    pub fn delays(&self) -> Vec<u64> {
        self.inner.lock().delays.clone()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.inner.lock().now_ms
    }

    fn delay_ms(&mut self, ms: u64) {
        let mut state = self.inner.lock();
        state.now_ms += ms;
        state.delays.push(ms);
    }
}

impl TimeSource for MockClock {
    fn now_ms(&self) -> u64 {
        self.inner.lock().now_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_time() {
        let mut clock = MockClock::new();
        let observer = clock.clone();

        clock.delay_ms(1000);
        observer.advance(500);

        assert_eq!(Clock::now_ms(&observer), 1500);
        assert_eq!(TimeSource::now_ms(&clock), 1500);
        assert_eq!(observer.delays(), vec![1000]);
    }

    #[test]
    fn test_elapsed_since_saturates() {
        let clock = MockClock::with_initial(100);
        assert_eq!(clock.elapsed_since(40), 60);
        assert_eq!(clock.elapsed_since(400), 0);
    }
}
