//! Platform interface traits
//!
//! # Safety Invariants
//!
//! - Each peripheral has exactly one owner
//! - No concurrent access: both nodes run a single thread of control

use crate::error::Result;
use crate::model::{LinkQuality, WakeCause};

/// Logic level of a digital output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinLevel {
    Low,
    High,
}

/// Blocking clock used by the transmitter
///
/// `delay_ms` parks the thread; mock implementations advance virtual time
/// instead so loops can be stepped deterministically.
pub trait Clock {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;

    /// Block for `ms` milliseconds
    fn delay_ms(&mut self, ms: u64);

    /// Elapsed time since a reference point, saturating on wrap
    fn elapsed_since(&self, reference_ms: u64) -> u64 {
        self.now_ms().saturating_sub(reference_ms)
    }
}

/// Read-only monotonic time used by the gateway
pub trait TimeSource {
    /// Milliseconds since the gateway started
    fn now_ms(&self) -> u64;
}

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high
    ///
    /// # Errors
    ///
    /// Returns `EltError::Platform` if the pin cannot be driven.
    fn set_high(&mut self) -> Result<()>;

    /// Drive the pin low
    ///
    /// # Errors
    ///
    /// Returns `EltError::Platform` if the pin cannot be driven.
    fn set_low(&mut self) -> Result<()>;

    /// Level last driven onto the pin
    fn level(&self) -> PinLevel;
}

/// Byte stream coming from the satellite-positioning receiver
pub trait PositionStream {
    /// Open the serial link to the receiver
    fn start(&mut self) -> Result<()>;

    /// Next available byte, or `None` if the receive buffer is empty
    fn read_byte(&mut self) -> Option<u8>;
}

/// Transmit side of the long-range radio
pub trait RadioTransmitter {
    /// Bring up the transceiver on the given carrier frequency
    ///
    /// # Errors
    ///
    /// Returns `EltError::Initialization` if the transceiver does not respond.
    fn begin(&mut self, frequency_hz: u64) -> Result<()>;

    /// Send one packet. Callers do not act on the result beyond logging it.
    fn send(&mut self, packet: &[u8]) -> Result<()>;
}

/// Receive side of the long-range radio
#[allow(async_fn_in_trait)]
pub trait RadioReceiver {
    /// Bring up the transceiver on the given carrier frequency
    ///
    /// # Errors
    ///
    /// Returns `EltError::Initialization` if the transceiver does not respond.
    fn begin(&mut self, frequency_hz: u64) -> Result<()>;

    /// Length of the next pending packet, or `None` if nothing arrived
    async fn poll(&mut self) -> Option<usize>;

    /// Copy the pending packet into `buffer`, returning the bytes copied.
    /// The packet is consumed even if `buffer` is shorter than the packet.
    fn read(&mut self, buffer: &mut [u8]) -> usize;

    /// Signal strength of the packet consumed by the last `read`
    fn signal_strength(&self) -> LinkQuality;
}

/// Wake-cause register, trigger configuration and deep sleep entry
pub trait WakeControl {
    /// Configure the single edge-sensitive wake input
    fn arm_trigger(&mut self) -> Result<()>;

    /// Why this boot happened
    fn cause(&self) -> WakeCause;

    /// Enter the low-power state
    ///
    /// On hardware this never returns: the next trigger restarts the
    /// processor at its entry point. Host implementations return once the
    /// trigger fires and the caller must start a fresh boot.
    ///
    /// # Errors
    ///
    /// Returns `EltError::Platform` if the trigger source is gone and no
    /// further wake can happen.
    fn suspend(&mut self) -> Result<()>;
}
