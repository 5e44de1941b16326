use crate::error::{EltError, Result};
use crate::model::WakeCause;
use crate::platform::traits::WakeControl;
use std::io::{BufRead, BufReader};
use std::time::Duration;
use tracing::info;

/// How the host stands in for the emergency button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerMode {
    /// Each line on stdin is a button press
    Console,
    /// Fire the trigger after a fixed delay
    Auto(Duration),
}

/// Console-driven wake controller
///
/// The first boot always reports `Reset` (power-up). Every later boot reports
/// `Trigger`, since the only way out of `suspend` is the trigger.
pub struct ConsoleWake {
    mode: TriggerMode,
    input: Box<dyn BufRead + Send>,
    cause: WakeCause,
    armed: bool,
}

impl ConsoleWake {
    pub fn new(mode: TriggerMode) -> Self {
        Self::with_input(mode, BufReader::new(std::io::stdin()))
    }

    /// Read button presses from `input` instead of stdin
    pub fn with_input(mode: TriggerMode, input: impl BufRead + Send + 'static) -> Self {
        Self {
            mode,
            input: Box::new(input),
            cause: WakeCause::Reset,
            armed: false,
        }
    }
}

impl WakeControl for ConsoleWake {
    fn arm_trigger(&mut self) -> Result<()> {
        self.armed = true;
        Ok(())
    }

    fn cause(&self) -> WakeCause {
        self.cause
    }

    fn suspend(&mut self) -> Result<()> {
        if !self.armed {
            info!("Wake trigger not armed, sleeping until power loss");
            loop {
                std::thread::park();
            }
        }

        match self.mode {
            TriggerMode::Console => {
                info!("Press Enter to fire the emergency trigger");
                let mut line = String::new();
                if self.input.read_line(&mut line)? == 0 {
                    return Err(EltError::Platform("trigger input closed".to_string()));
                }
            }
            TriggerMode::Auto(delay) => {
                info!("Auto trigger in {:?}", delay);
                std::thread::sleep(delay);
            }
        }

        self.cause = WakeCause::Trigger;
        self.armed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_fires_trigger() {
        let mut wake = ConsoleWake::with_input(TriggerMode::Console, Cursor::new(b"\n".to_vec()));
        assert_eq!(wake.cause(), WakeCause::Reset);

        wake.arm_trigger().unwrap();
        wake.suspend().unwrap();
        assert_eq!(wake.cause(), WakeCause::Trigger);
    }

    #[test]
    fn test_closed_input_is_reported() {
        let mut wake = ConsoleWake::with_input(TriggerMode::Console, Cursor::new(Vec::new()));
        wake.arm_trigger().unwrap();

        assert!(matches!(wake.suspend(), Err(EltError::Platform(_))));
        assert_eq!(wake.cause(), WakeCause::Reset);
    }

    #[test]
    fn test_auto_trigger_fires_after_delay() {
        let mut wake = ConsoleWake::with_input(
            TriggerMode::Auto(Duration::from_millis(1)),
            Cursor::new(Vec::new()),
        );
        wake.arm_trigger().unwrap();
        wake.suspend().unwrap();
        assert_eq!(wake.cause(), WakeCause::Trigger);
    }
}
