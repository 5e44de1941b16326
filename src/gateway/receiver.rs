//! Receive loop: length filter, decode, dispatch

use super::dispatcher::{DispatchContext, DispatchReport, UploadDispatcher};
use super::network::NetworkLink;
use super::transport::HttpTransport;
use crate::codec::{self, FRAME_LEN};
use crate::model::{LinkQuality, PositionRecord};
use crate::platform::traits::{RadioReceiver, TimeSource};
use std::time::Duration;
use tracing::{info, warn};

/// Scratch size for draining packets that are not ours
const MAX_PACKET_SIZE: usize = 255;

/// Pause before polling again when the radio reported nothing
const IDLE_BACKOFF: Duration = Duration::from_millis(5);

/// A frame that passed the filter and was handed to the dispatcher
#[derive(Debug, Clone)]
pub struct ReceivedFix {
    pub record: PositionRecord,
    pub quality: LinkQuality,
    /// Gateway clock reading when the frame was decoded
    pub received_at_ms: u64,
    pub report: DispatchReport,
}

#[derive(Debug, Clone)]
pub enum ReceiveOutcome {
    /// Nothing pending on the radio
    Idle,
    /// Packet of the wrong length, dropped unread
    Discarded { len: usize },
    Forwarded(ReceivedFix),
}

/// Counters kept by the receive loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    pub forwarded: u64,
    pub discarded: u64,
}

pub struct ReceiveLoop<R, N, T, K>
where
    R: RadioReceiver,
    N: NetworkLink,
    T: HttpTransport,
    K: TimeSource,
{
    radio: R,
    network: N,
    dispatcher: UploadDispatcher<T>,
    clock: K,
    stats: ReceiveStats,
}

impl<R, N, T, K> ReceiveLoop<R, N, T, K>
where
    R: RadioReceiver,
    N: NetworkLink,
    T: HttpTransport,
    K: TimeSource,
{
    /// Expects the radio started
    pub fn new(radio: R, network: N, dispatcher: UploadDispatcher<T>, clock: K) -> Self {
        Self {
            radio,
            network,
            dispatcher,
            clock,
            stats: ReceiveStats::default(),
        }
    }

    pub fn stats(&self) -> ReceiveStats {
        self.stats
    }

    pub fn dispatcher(&self) -> &UploadDispatcher<T> {
        &self.dispatcher
    }

    /// Handle at most one packet
    pub async fn poll_once(&mut self) -> ReceiveOutcome {
        let len = match self.radio.poll().await {
            Some(len) => len,
            None => return ReceiveOutcome::Idle,
        };

        if len != FRAME_LEN {
            let mut scratch = [0u8; MAX_PACKET_SIZE];
            self.radio.read(&mut scratch);
            self.stats.discarded += 1;
            warn!("RX: discarded {} byte packet (expected {})", len, FRAME_LEN);
            return ReceiveOutcome::Discarded { len };
        }

        let mut frame = [0u8; FRAME_LEN];
        let read = self.radio.read(&mut frame);
        let quality = self.radio.signal_strength();

        let record = match codec::decode(&frame[..read]) {
            Ok(record) => record,
            Err(e) => {
                // Radio delivered fewer bytes than it announced
                self.stats.discarded += 1;
                warn!("RX: {}", e);
                return ReceiveOutcome::Discarded { len: read };
            }
        };
        info!("RX: {}  RSSI: {}", record, quality.rssi());

        let now_ms = self.clock.now_ms();
        let ctx = DispatchContext {
            now_ms,
            link_up: self.network.refresh().await,
        };
        let report = self.dispatcher.dispatch(&record, quality, ctx).await;
        self.stats.forwarded += 1;

        ReceiveOutcome::Forwarded(ReceivedFix {
            record,
            quality,
            received_at_ms: now_ms,
            report,
        })
    }

    /// Receive forever
    pub async fn run(mut self) -> ! {
        info!("LoRa RX ready");
        loop {
            if let ReceiveOutcome::Idle = self.poll_once().await {
                tokio::time::sleep(IDLE_BACKOFF).await;
            }
        }
    }
}
