//! Per-destination rate-limited fan-out
//!
//! Policy for each destination, evaluated in registration order:
//! - link down: skip, gate untouched
//! - gate closed (`now - last < min_interval`): skip, nothing queued
//! - otherwise: attempt once, then move the gate to `now` whatever the result
//!
//! There is no retry and no backoff. A failed attempt waits for the next
//! natural interval like a successful one.

use super::transport::{HttpTransport, UploadRequest};
use crate::model::{LinkQuality, PositionRecord};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Gate clock of one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationState {
    last_upload_ms: Option<u64>,
    min_interval_ms: u64,
}

impl DestinationState {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_upload_ms: None,
            min_interval_ms: min_interval.as_millis() as u64,
        }
    }

    /// `None` until the first attempt
    pub fn last_upload_ms(&self) -> Option<u64> {
        self.last_upload_ms
    }

    pub fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Time left before the gate opens, 0 if open
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_upload_ms {
            None => 0,
            Some(last) => self
                .min_interval_ms
                .saturating_sub(now_ms.saturating_sub(last)),
        }
    }

    pub fn is_open(&self, now_ms: u64) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    fn record_attempt(&mut self, now_ms: u64) {
        self.last_upload_ms = Some(now_ms);
    }
}

/// A cloud endpoint that accepts position updates
pub trait Destination: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &str;

    fn min_interval(&self) -> Duration;

    fn build_request(&self, record: &PositionRecord, quality: LinkQuality) -> UploadRequest;
}

/// Snapshot handed to every `maybe_upload` of one dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchContext {
    pub now_ms: u64,
    pub link_up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// No network association; gate untouched
    Offline,
    /// Gate still closed
    Gated { remaining_ms: u64 },
    Delivered,
    /// Transport failure, absorbed; the gate still advanced
    Failed(String),
}

impl UploadOutcome {
    pub fn attempted(&self) -> bool {
        matches!(self, UploadOutcome::Delivered | UploadOutcome::Failed(_))
    }
}

/// One destination and its gate
pub struct Sink {
    destination: Box<dyn Destination>,
    state: DestinationState,
}

impl Sink {
    pub fn new(destination: Box<dyn Destination>) -> Self {
        let state = DestinationState::new(destination.min_interval());
        Self { destination, state }
    }

    pub fn name(&self) -> &str {
        self.destination.name()
    }

    pub fn state(&self) -> &DestinationState {
        &self.state
    }

    /// Evaluate this destination's gate and deliver if it is open
    pub async fn maybe_upload<T: HttpTransport>(
        &mut self,
        transport: &T,
        record: &PositionRecord,
        quality: LinkQuality,
        ctx: DispatchContext,
    ) -> UploadOutcome {
        if !ctx.link_up {
            return UploadOutcome::Offline;
        }

        let remaining_ms = self.state.remaining_ms(ctx.now_ms);
        if remaining_ms > 0 {
            debug!("{}: gated for another {} ms", self.name(), remaining_ms);
            return UploadOutcome::Gated { remaining_ms };
        }

        let request = self.destination.build_request(record, quality);
        let outcome = match transport.send(&request).await {
            Ok(()) => {
                info!("{} upload sent", self.name());
                UploadOutcome::Delivered
            }
            Err(e) => {
                warn!("{} upload failed: {}", self.name(), e);
                UploadOutcome::Failed(e.to_string())
            }
        };
        self.state.record_attempt(ctx.now_ms);
        outcome
    }
}

/// Per-destination outcomes of one dispatch, in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcomes: Vec<(String, UploadOutcome)>,
}

impl DispatchReport {
    pub fn outcome(&self, name: &str) -> Option<&UploadOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| o)
    }

    pub fn attempts(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.attempted()).count()
    }
}

/// Fans one received fix out to every configured destination
pub struct UploadDispatcher<T: HttpTransport> {
    transport: T,
    sinks: Vec<Sink>,
}

impl<T: HttpTransport> UploadDispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sinks: Vec::new(),
        }
    }

    /// Destinations are evaluated in the order they were added
    pub fn with_destination(mut self, destination: Box<dyn Destination>) -> Self {
        self.add_destination(destination);
        self
    }

    pub fn add_destination(&mut self, destination: Box<dyn Destination>) {
        info!(
            "Upload destination {} (min interval {:?})",
            destination.name(),
            destination.min_interval()
        );
        self.sinks.push(Sink::new(destination));
    }

    pub fn sinks(&self) -> &[Sink] {
        &self.sinks
    }

    pub fn state(&self, name: &str) -> Option<&DestinationState> {
        self.sinks
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.state())
    }

    /// Run `maybe_upload` for every destination. Never fails.
    pub async fn dispatch(
        &mut self,
        record: &PositionRecord,
        quality: LinkQuality,
        ctx: DispatchContext,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for sink in &mut self.sinks {
            let outcome = sink
                .maybe_upload(&self.transport, record, quality, ctx)
                .await;
            report.outcomes.push((sink.name().to_string(), outcome));
        }
        report
    }
}
