//! In-memory platform implementations
//!
//! Every mock is a cheap `Clone` handle over shared state, so a test can keep
//! one copy for inspection while the node under test owns another.

pub mod clock;
pub mod gpio;
pub mod position;
pub mod radio;
pub mod wake;

pub use clock::MockClock;
pub use gpio::MockPin;
pub use position::MockPositionStream;
pub use radio::{MockRadio, MockRadioReceiver};
pub use wake::MockWake;
