//! Mock wake-cause register and sleep controller

use crate::error::{EltError, Result};
use crate::model::WakeCause;
use crate::platform::traits::WakeControl;
use parking_lot::Mutex;
use std::sync::Arc;

/// Reports a fixed wake cause and counts sleep entries
#[derive(Debug, Clone)]
pub struct MockWake {
    inner: Arc<Mutex<WakeRegister>>,
}

#[derive(Debug)]
struct WakeRegister {
    cause: WakeCause,
    armed: bool,
    suspends: usize,
    closed: bool,
}

impl MockWake {
    pub fn new(cause: WakeCause) -> Self {
        Self {
            inner: Arc::new(Mutex::new(WakeRegister {
                cause,
                armed: false,
                suspends: 0,
                closed: false,
            })),
        }
    }

    /// Change the cause reported on the next boot
    pub fn set_cause(&self, cause: WakeCause) {
        self.inner.lock().cause = cause;
    }

    pub fn is_armed(&self) -> bool {
        self.inner.lock().armed
    }

    pub fn suspends(&self) -> usize {
        self.inner.lock().suspends
    }

    /// Make every later `suspend` report that no trigger can arrive
    pub fn close(&self) {
        self.inner.lock().closed = true;
    }
}

impl WakeControl for MockWake {
    fn arm_trigger(&mut self) -> Result<()> {
        self.inner.lock().armed = true;
        Ok(())
    }

    fn cause(&self) -> WakeCause {
        self.inner.lock().cause
    }

    fn suspend(&mut self) -> Result<()> {
        let mut state = self.inner.lock();
        state.suspends += 1;
        if state.closed {
            return Err(EltError::Platform("wake trigger closed".to_string()));
        }
        Ok(())
    }
}
