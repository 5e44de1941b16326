use crate::error::Result;
use crate::platform::traits::{OutputPin, PinLevel};
use tracing::debug;

/// Output pin with no hardware behind it
///
/// Level changes are logged, which is enough to watch the receiver power
/// gate switch during a host run.
pub struct LoggedPin {
    name: &'static str,
    level: PinLevel,
}

impl LoggedPin {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            level: PinLevel::Low,
        }
    }
}

impl OutputPin for LoggedPin {
    fn set_high(&mut self) -> Result<()> {
        debug!("{} -> high", self.name);
        self.level = PinLevel::High;
        Ok(())
    }

    fn set_low(&mut self) -> Result<()> {
        debug!("{} -> low", self.name);
        self.level = PinLevel::Low;
        Ok(())
    }

    fn level(&self) -> PinLevel {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_last_level() {
        let mut pin = LoggedPin::new("gps-power");
        assert_eq!(pin.level(), PinLevel::Low);
        pin.set_high().unwrap();
        assert_eq!(pin.level(), PinLevel::High);
        pin.set_low().unwrap();
        assert_eq!(pin.level(), PinLevel::Low);
    }
}
