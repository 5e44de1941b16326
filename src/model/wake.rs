use serde::{Deserialize, Serialize};

/// Hardware-reported reason the processor started executing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeCause {
    /// Power-on, brown-out or any reset that is not the wake trigger
    Reset,
    /// The designated wake input saw its edge
    Trigger,
}

/// Boot classification, fixed for the lifetime of one boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WakeState {
    ColdStart,
    WokenByTrigger,
}

impl From<WakeCause> for WakeState {
    fn from(cause: WakeCause) -> Self {
        match cause {
            WakeCause::Reset => WakeState::ColdStart,
            WakeCause::Trigger => WakeState::WokenByTrigger,
        }
    }
}
