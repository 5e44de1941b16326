//! Hardware seams shared by both nodes
//!
//! Node logic in `transmitter` and `gateway` is generic over the traits in
//! [`traits`]. [`mock`] provides in-memory implementations for tests and
//! [`host`] provides implementations that run on a workstation (UDP radio
//! bridge, NMEA replay, stdin trigger).

pub mod host;
pub mod mock;
pub mod traits;

pub use traits::{
    Clock, OutputPin, PinLevel, PositionStream, RadioReceiver, RadioTransmitter, TimeSource,
    WakeControl,
};
