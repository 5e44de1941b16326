pub mod link;
pub mod record;
pub mod wake;

pub use link::LinkQuality;
pub use record::PositionRecord;
pub use wake::{WakeCause, WakeState};
