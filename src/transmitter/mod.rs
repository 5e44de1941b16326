//! Transmitter node
//!
//! Sleeps until the emergency trigger, then transmits its position every
//! interval until reset or power loss.

pub mod acquisition;
pub mod gps;
pub mod power;

pub use acquisition::{AcquisitionConfig, AcquisitionLoop, FixSource, Transmission};
pub use gps::{FixParser, NmeaFixParser};
pub use power::{BootOutcome, PowerController, PowerGate, PowerState, SleepReason};

use crate::error::Result;
use crate::platform::traits::{Clock, OutputPin, PositionStream, RadioTransmitter, WakeControl};
use std::convert::Infallible;
use tracing::error;

/// All transmitter peripherals plus the controller that sequences them
pub struct Transmitter<P, W, S, R, F, C>
where
    P: OutputPin,
    W: WakeControl,
    S: PositionStream,
    R: RadioTransmitter,
    F: FixParser,
    C: Clock,
{
    controller: PowerController<P>,
    wake: W,
    stream: S,
    radio: R,
    parser: F,
    clock: C,
    acquisition: AcquisitionConfig,
}

impl<P, W, S, R, F, C> Transmitter<P, W, S, R, F, C>
where
    P: OutputPin,
    W: WakeControl,
    S: PositionStream,
    R: RadioTransmitter,
    F: FixParser,
    C: Clock,
{
    pub fn new(
        controller: PowerController<P>,
        wake: W,
        stream: S,
        radio: R,
        parser: F,
        clock: C,
        acquisition: AcquisitionConfig,
    ) -> Self {
        Self {
            controller,
            wake,
            stream,
            radio,
            parser,
            clock,
            acquisition,
        }
    }

    /// One pass through the boot sequence
    ///
    /// A platform fault is treated like a failed radio: peripherals are
    /// powered down and the node goes back to sleep.
    pub fn boot(&mut self) -> BootOutcome {
        match self.controller.boot(
            &mut self.wake,
            &mut self.stream,
            &mut self.radio,
            &mut self.clock,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Boot fault: {}", e);
                if let Err(e) = self.controller.power_down() {
                    error!("Power down failed: {}", e);
                }
                BootOutcome::Sleep(SleepReason::PlatformFault(e.to_string()))
            }
        }
    }

    pub fn power_state(&self) -> PowerState {
        self.controller.state()
    }

    /// Hand the peripherals to the acquisition loop
    pub fn into_loop(self) -> AcquisitionLoop<S, R, F, C> {
        AcquisitionLoop::new(
            self.stream,
            self.radio,
            self.parser,
            self.clock,
            self.acquisition,
        )
    }

    /// Boot, sleep or transmit, forever
    ///
    /// # Errors
    ///
    /// Only returns when the wake source reports that no trigger can arrive
    /// any more.
    pub fn run(mut self) -> Result<Infallible> {
        loop {
            match self.boot() {
                BootOutcome::Active => self.into_loop().run(),
                BootOutcome::Sleep(_) => self.wake.suspend()?,
            }
        }
    }
}
