//! Fix acquisition loop
//!
//! Each cycle samples the position receiver for a fixed window, transmits
//! either the parsed fix or the fallback pair, then rests. A transmission is
//! never withheld for lack of a fix.
//!
//! ```text
//! Acquiring (window) ──► Transmitting ──► Idle (interval) ──► Acquiring ...
//! ```

use super::gps::FixParser;
use crate::codec;
use crate::model::PositionRecord;
use crate::platform::traits::{Clock, PositionStream, RadioTransmitter};
use tracing::{info, warn};

/// Granularity at which the sampling window drains the receiver
const SAMPLE_POLL_MS: u64 = 10;

/// Timing and fallback for the acquisition loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquisitionConfig {
    pub sample_window_ms: u64,
    pub tx_interval_ms: u64,
    pub fallback: PositionRecord,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_window_ms: 1000,
            tx_interval_ms: 2000,
            fallback: PositionRecord::new(43.79560, -79.35051),
        }
    }
}

/// Where the transmitted coordinates came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixSource {
    Gps,
    /// No valid fix inside the sampling window
    Fallback,
}

impl std::fmt::Display for FixSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixSource::Gps => write!(f, "GPS"),
            FixSource::Fallback => write!(f, "Fallback"),
        }
    }
}

/// One transmitted record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transmission {
    pub record: PositionRecord,
    pub source: FixSource,
    pub sent_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Acquiring,
    Transmitting,
}

/// What a single `step` did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepEvent {
    Sampled { record: PositionRecord, source: FixSource },
    Transmitted(Transmission),
    Rested,
}

pub struct AcquisitionLoop<S, R, F, C>
where
    S: PositionStream,
    R: RadioTransmitter,
    F: FixParser,
    C: Clock,
{
    stream: S,
    radio: R,
    parser: F,
    clock: C,
    config: AcquisitionConfig,
    state: LoopState,
    pending: Option<(PositionRecord, FixSource)>,
    cycles: u64,
}

impl<S, R, F, C> AcquisitionLoop<S, R, F, C>
where
    S: PositionStream,
    R: RadioTransmitter,
    F: FixParser,
    C: Clock,
{
    /// Expects the stream started and the radio initialized
    pub fn new(stream: S, radio: R, parser: F, clock: C, config: AcquisitionConfig) -> Self {
        Self {
            stream,
            radio,
            parser,
            clock,
            config,
            state: LoopState::Acquiring,
            pending: None,
            cycles: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Completed transmit cycles
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Advance the state machine by one state
    pub fn step(&mut self) -> StepEvent {
        match self.state {
            LoopState::Acquiring => {
                let (record, source) = self.acquire();
                self.pending = Some((record, source));
                self.state = LoopState::Transmitting;
                StepEvent::Sampled { record, source }
            }
            LoopState::Transmitting => {
                let (record, source) = self
                    .pending
                    .take()
                    .unwrap_or((self.config.fallback, FixSource::Fallback));
                let transmission = self.transmit(record, source);
                self.state = LoopState::Idle;
                StepEvent::Transmitted(transmission)
            }
            LoopState::Idle => {
                self.clock.delay_ms(self.config.tx_interval_ms);
                self.cycles += 1;
                self.state = LoopState::Acquiring;
                StepEvent::Rested
            }
        }
    }

    /// Run steps until one full acquire, transmit, rest cycle has completed
    pub fn cycle(&mut self) -> Transmission {
        let mut sent = None;
        loop {
            match self.step() {
                StepEvent::Transmitted(t) => sent = Some(t),
                StepEvent::Rested => {
                    if let Some(t) = sent {
                        return t;
                    }
                }
                StepEvent::Sampled { .. } => {}
            }
        }
    }

    /// Transmit forever. Only a reset or power loss ends this.
    pub fn run(mut self) -> ! {
        info!(
            "Transmitting every {} ms (sample window {} ms)",
            self.config.tx_interval_ms, self.config.sample_window_ms
        );
        loop {
            self.step();
        }
    }

    /// Drain the receiver for one sampling window
    fn acquire(&mut self) -> (PositionRecord, FixSource) {
        let start = self.clock.now_ms();
        while self.clock.elapsed_since(start) < self.config.sample_window_ms {
            while let Some(byte) = self.stream.read_byte() {
                self.parser.feed(byte);
            }
            self.clock.delay_ms(SAMPLE_POLL_MS);
        }

        match self.parser.fix() {
            Some(fix) => (
                PositionRecord::new(fix.latitude as f32, fix.longitude as f32),
                FixSource::Gps,
            ),
            None => (self.config.fallback, FixSource::Fallback),
        }
    }

    fn transmit(&mut self, record: PositionRecord, source: FixSource) -> Transmission {
        let frame = codec::encode(&record);
        if let Err(e) = self.radio.send(&frame) {
            warn!("TX send error: {}", e);
        }
        info!("TX: {}  Status: {}", record, source);

        Transmission {
            record,
            source,
            sent_at_ms: self.clock.now_ms(),
        }
    }
}
