//! Workstation implementations of the platform traits
//!
//! The radio link is bridged over UDP datagrams (one datagram per packet),
//! the position receiver is replayed from an NMEA capture and the wake
//! button is the console.

pub mod clock;
pub mod gpio;
pub mod nmea;
pub mod trigger;
pub mod udp;

pub use clock::SystemClock;
pub use gpio::LoggedPin;
pub use nmea::NmeaReplayStream;
pub use trigger::{ConsoleWake, TriggerMode};
pub use udp::{UdpRadio, UdpRadioReceiver};
