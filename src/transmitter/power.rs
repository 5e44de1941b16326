//! Power/wake controller
//!
//! ```text
//! boot ──► arm trigger, gate off ──► read wake cause
//!              Reset   ──► Asleep (no peripheral touched)
//!              Trigger ──► gate on, settle, start stream, radio begin
//!                              ok   ──► Active (acquisition loop takes over)
//!                              fail ──► gate off ──► Asleep
//! ```

use crate::error::Result;
use crate::model::{WakeCause, WakeState};
use crate::platform::traits::{
    Clock, OutputPin, PinLevel, PositionStream, RadioTransmitter, WakeControl,
};
use tracing::{info, warn};

/// Power state of the transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    Asleep,
    Active,
}

/// Why a boot ended in the low-power state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SleepReason {
    /// Power-up or reset without the trigger: nothing to do
    ColdStart,
    /// The radio failed to start; the position source was powered down again
    RadioInitFailed(String),
    /// A pin or the wake register faulted during boot
    PlatformFault(String),
}

/// Result of one boot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Re-enter low power
    Sleep(SleepReason),
    /// Peripherals are up, hand over to the acquisition loop
    Active,
}

/// Active-low power switch in front of the position receiver
///
/// The gate drives a P-MOSFET: pin low powers the receiver, pin high cuts it.
pub struct PowerGate<P: OutputPin> {
    pin: P,
    settle_delay_ms: u64,
}

impl<P: OutputPin> PowerGate<P> {
    pub fn new(pin: P, settle_delay_ms: u64) -> Self {
        Self {
            pin,
            settle_delay_ms,
        }
    }

    /// Power the receiver and wait until it can be queried
    pub fn power_on<C: Clock>(&mut self, clock: &mut C) -> Result<()> {
        self.pin.set_low()?;
        clock.delay_ms(self.settle_delay_ms);
        Ok(())
    }

    pub fn power_off(&mut self) -> Result<()> {
        self.pin.set_high()
    }

    pub fn is_powered(&self) -> bool {
        self.pin.level() == PinLevel::Low
    }
}

/// Decides, once per boot, between low power and the active sequence
pub struct PowerController<P: OutputPin> {
    gate: PowerGate<P>,
    frequency_hz: u64,
    state: PowerState,
    wake_state: Option<WakeState>,
}

impl<P: OutputPin> PowerController<P> {
    pub fn new(gate: PowerGate<P>, frequency_hz: u64) -> Self {
        Self {
            gate,
            frequency_hz,
            state: PowerState::Asleep,
            wake_state: None,
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Boot classification of the current boot, `None` before `boot` runs
    pub fn wake_state(&self) -> Option<WakeState> {
        self.wake_state
    }

    /// Run the boot sequence
    ///
    /// # Errors
    ///
    /// Returns `EltError::Platform` if the wake trigger cannot be armed or the
    /// power gate cannot be driven. Radio failures are not errors: they end
    /// in `BootOutcome::Sleep(SleepReason::RadioInitFailed)`.
    pub fn boot<W, S, R, C>(
        &mut self,
        wake: &mut W,
        stream: &mut S,
        radio: &mut R,
        clock: &mut C,
    ) -> Result<BootOutcome>
    where
        W: WakeControl,
        S: PositionStream,
        R: RadioTransmitter,
        C: Clock,
    {
        self.state = PowerState::Asleep;

        wake.arm_trigger()?;
        // Receiver unpowered until we know why we woke
        self.gate.power_off()?;

        let cause = wake.cause();
        let wake_state = WakeState::from(cause);
        self.wake_state = Some(wake_state);

        if cause == WakeCause::Reset {
            info!("ELT armed, entering deep sleep until the emergency trigger");
            return Ok(BootOutcome::Sleep(SleepReason::ColdStart));
        }

        info!("ELT emergency trigger, starting position receiver and radio");
        self.gate.power_on(clock)?;
        stream.start()?;

        if let Err(e) = radio.begin(self.frequency_hz) {
            warn!("Radio init failed ({}), powering down and going back to sleep", e);
            self.gate.power_off()?;
            return Ok(BootOutcome::Sleep(SleepReason::RadioInitFailed(
                e.to_string(),
            )));
        }

        info!("Radio up at {} Hz", self.frequency_hz);
        self.state = PowerState::Active;
        Ok(BootOutcome::Active)
    }

    /// Cut peripheral power after an unexpected fault
    pub fn power_down(&mut self) -> Result<()> {
        self.state = PowerState::Asleep;
        self.gate.power_off()
    }

    pub fn is_receiver_powered(&self) -> bool {
        self.gate.is_powered()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EltError;
    use crate::platform::mock::{MockClock, MockPin, MockPositionStream, MockRadio, MockWake};

    struct Rig {
        pin: MockPin,
        stream: MockPositionStream,
        radio: MockRadio,
        wake: MockWake,
        clock: MockClock,
        controller: PowerController<MockPin>,
    }

    fn rig(cause: WakeCause, radio: MockRadio) -> Rig {
        let pin = MockPin::new();
        Rig {
            controller: PowerController::new(PowerGate::new(pin.clone(), 150), 915_000_000),
            pin,
            stream: MockPositionStream::new(),
            radio,
            wake: MockWake::new(cause),
            clock: MockClock::new(),
        }
    }

    fn boot(rig: &mut Rig) -> BootOutcome {
        rig.controller
            .boot(&mut rig.wake, &mut rig.stream, &mut rig.radio, &mut rig.clock)
            .unwrap()
    }

    #[test]
    fn test_cold_start_activates_nothing() {
        let mut rig = rig(WakeCause::Reset, MockRadio::new());

        let outcome = boot(&mut rig);

        assert_eq!(outcome, BootOutcome::Sleep(SleepReason::ColdStart));
        assert_eq!(rig.controller.state(), PowerState::Asleep);
        assert_eq!(rig.controller.wake_state(), Some(WakeState::ColdStart));
        assert!(rig.wake.is_armed());
        // Only the safe default level is ever written
        assert_eq!(rig.pin.history(), vec![PinLevel::High]);
        assert!(!rig.stream.is_started());
        assert_eq!(rig.radio.begin_calls(), 0);
        assert!(rig.radio.sent().is_empty());
        assert!(rig.clock.delays().is_empty());
    }

    #[test]
    fn test_trigger_powers_up_and_activates() {
        let mut rig = rig(WakeCause::Trigger, MockRadio::new());

        let outcome = boot(&mut rig);

        assert_eq!(outcome, BootOutcome::Active);
        assert_eq!(rig.controller.state(), PowerState::Active);
        assert_eq!(rig.controller.wake_state(), Some(WakeState::WokenByTrigger));
        assert_eq!(rig.pin.history(), vec![PinLevel::High, PinLevel::Low]);
        assert!(rig.controller.is_receiver_powered());
        assert_eq!(rig.clock.delays(), vec![150]);
        assert!(rig.stream.is_started());
        assert_eq!(rig.radio.frequency_hz(), Some(915_000_000));
    }

    #[test]
    fn test_radio_failure_powers_down_without_sending() {
        let mut rig = rig(WakeCause::Trigger, MockRadio::failing());

        let outcome = boot(&mut rig);

        assert!(matches!(
            outcome,
            BootOutcome::Sleep(SleepReason::RadioInitFailed(_))
        ));
        assert_eq!(rig.controller.state(), PowerState::Asleep);
        assert_eq!(
            rig.pin.history(),
            vec![PinLevel::High, PinLevel::Low, PinLevel::High]
        );
        assert!(!rig.controller.is_receiver_powered());
        assert_eq!(rig.radio.begin_calls(), 1);
        assert!(rig.radio.sent().is_empty());
    }

    #[test]
    fn test_gate_fault_is_reported() {
        let mut rig = rig(WakeCause::Trigger, MockRadio::new());
        rig.pin.set_fail_writes(true);

        let result = rig
            .controller
            .boot(&mut rig.wake, &mut rig.stream, &mut rig.radio, &mut rig.clock);

        assert!(matches!(result, Err(EltError::Platform(_))));
        assert_eq!(rig.radio.begin_calls(), 0);
    }
}
