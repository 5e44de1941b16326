//! Mock satellite-receiver byte stream

use crate::error::Result;
use crate::platform::traits::PositionStream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// In-memory receive buffer standing in for the receiver's serial port
#[derive(Debug, Clone, Default)]
pub struct MockPositionStream {
    inner: Arc<Mutex<StreamState>>,
}

#[derive(Debug, Default)]
struct StreamState {
    rx: VecDeque<u8>,
    started: bool,
}

impl MockPositionStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the receiver had sent them
    pub fn inject(&self, data: &[u8]) {
        self.inner.lock().rx.extend(data.iter().copied());
    }

    pub fn is_started(&self) -> bool {
        self.inner.lock().started
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().rx.len()
    }
}

impl PositionStream for MockPositionStream {
    fn start(&mut self) -> Result<()> {
        self.inner.lock().started = true;
        Ok(())
    }

    fn read_byte(&mut self) -> Option<u8> {
        let mut state = self.inner.lock();
        if !state.started {
            return None;
        }
        state.rx.pop_front()
    }
}
