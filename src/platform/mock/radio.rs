//! Mock radio transceivers

use crate::error::{EltError, Result};
use crate::model::LinkQuality;
use crate::platform::traits::{RadioReceiver, RadioTransmitter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Mock transmit radio
///
/// Records every sent packet. `begin` can be made to fail to exercise the
/// transmitter's fail-safe path.
#[derive(Debug, Clone, Default)]
pub struct MockRadio {
    inner: Arc<Mutex<TxState>>,
}

#[derive(Debug, Default)]
struct TxState {
    fail_begin: bool,
    fail_send: bool,
    frequency_hz: Option<u64>,
    begin_calls: usize,
    sent: Vec<Vec<u8>>,
}

impl MockRadio {
    pub fn new() -> Self {
        Self::default()
    }

    /// A radio whose `begin` always fails
    pub fn failing() -> Self {
        let radio = Self::new();
        radio.inner.lock().fail_begin = true;
        radio
    }

    pub fn set_fail_send(&self, fail: bool) {
        self.inner.lock().fail_send = fail;
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.inner.lock().sent.clone()
    }

    pub fn begin_calls(&self) -> usize {
        self.inner.lock().begin_calls
    }

    pub fn frequency_hz(&self) -> Option<u64> {
        self.inner.lock().frequency_hz
    }
}

impl RadioTransmitter for MockRadio {
    fn begin(&mut self, frequency_hz: u64) -> Result<()> {
        let mut state = self.inner.lock();
        state.begin_calls += 1;
        if state.fail_begin {
            return Err(EltError::Initialization(
                "transceiver did not respond".to_string(),
            ));
        }
        state.frequency_hz = Some(frequency_hz);
        Ok(())
    }

    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let mut state = self.inner.lock();
        if state.frequency_hz.is_none() {
            return Err(EltError::Platform("radio not initialized".to_string()));
        }
        if state.fail_send {
            return Err(EltError::Platform("TX FIFO error".to_string()));
        }
        state.sent.push(packet.to_vec());
        Ok(())
    }
}

/// Mock receive radio fed from a queue of `(packet, rssi)` pairs
#[derive(Debug, Clone, Default)]
pub struct MockRadioReceiver {
    inner: Arc<Mutex<RxState>>,
}

#[derive(Debug, Default)]
struct RxState {
    fail_begin: bool,
    started: bool,
    queue: VecDeque<(Vec<u8>, i16)>,
    last_rssi: i16,
}

impl MockRadioReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let radio = Self::new();
        radio.inner.lock().fail_begin = true;
        radio
    }

    /// Queue a packet as if it had just been demodulated
    pub fn inject(&self, packet: &[u8], rssi: i16) {
        self.inner.lock().queue.push_back((packet.to_vec(), rssi));
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }
}

impl RadioReceiver for MockRadioReceiver {
    fn begin(&mut self, _frequency_hz: u64) -> Result<()> {
        let mut state = self.inner.lock();
        if state.fail_begin {
            return Err(EltError::Initialization(
                "transceiver did not respond".to_string(),
            ));
        }
        state.started = true;
        Ok(())
    }

    async fn poll(&mut self) -> Option<usize> {
        let state = self.inner.lock();
        if !state.started {
            return None;
        }
        state.queue.front().map(|(packet, _)| packet.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> usize {
        let mut state = self.inner.lock();
        match state.queue.pop_front() {
            Some((packet, rssi)) => {
                state.last_rssi = rssi;
                let n = packet.len().min(buffer.len());
                buffer[..n].copy_from_slice(&packet[..n]);
                n
            }
            None => 0,
        }
    }

    fn signal_strength(&self) -> LinkQuality {
        LinkQuality::new(self.inner.lock().last_rssi)
    }
}
