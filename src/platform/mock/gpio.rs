//! Mock GPIO output for testing

use crate::error::{EltError, Result};
use crate::platform::traits::{OutputPin, PinLevel};
use parking_lot::Mutex;
use std::sync::Arc;

/// Mock output pin
///
/// Records every level written so tests can assert the exact drive sequence.
#[derive(Debug, Clone, Default)]
pub struct MockPin {
    inner: Arc<Mutex<PinState>>,
}

#[derive(Debug, Default)]
struct PinState {
    history: Vec<PinLevel>,
    fail_writes: bool,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every level written, oldest first
    pub fn history(&self) -> Vec<PinLevel> {
        self.inner.lock().history.clone()
    }

    /// Make subsequent writes fail (simulates a dead GPIO bank)
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    fn write(&self, level: PinLevel) -> Result<()> {
        let mut state = self.inner.lock();
        if state.fail_writes {
            return Err(EltError::Platform("GPIO write failed".to_string()));
        }
        state.history.push(level);
        Ok(())
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) -> Result<()> {
        self.write(PinLevel::High)
    }

    fn set_low(&mut self) -> Result<()> {
        self.write(PinLevel::Low)
    }

    fn level(&self) -> PinLevel {
        // Floating pins read low on the boards we target
        self.inner
            .lock()
            .history
            .last()
            .copied()
            .unwrap_or(PinLevel::Low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_pin_history() {
        let mut pin = MockPin::new();
        let observer = pin.clone();

        pin.set_high().unwrap();
        pin.set_low().unwrap();

        assert_eq!(observer.history(), vec![PinLevel::High, PinLevel::Low]);
        assert_eq!(observer.level(), PinLevel::Low);
    }

    #[test]
    fn test_mock_pin_failure() {
        let mut pin = MockPin::new();
        pin.set_fail_writes(true);
        assert!(pin.set_high().is_err());
        assert!(pin.history().is_empty());
    }
}
