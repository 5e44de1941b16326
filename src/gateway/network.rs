//! Network association
//!
//! Association is bounded: if the link is not up within the budget the
//! gateway keeps receiving and simply skips every upload. After that the
//! receive loop calls `refresh` before each dispatch, so a link lost later
//! is reported as down instead of turning every upload into a failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::Instant;
use tracing::{info, warn};

/// Delay between association attempts
const ASSOCIATION_RETRY: Duration = Duration::from_millis(500);

/// Upper bound on one reachability check during `refresh`
const PROBE_TIMEOUT: Duration = Duration::from_secs(1);

/// Minimum time between two reachability checks during `refresh`
const RECHECK_INTERVAL: Duration = Duration::from_secs(2);

/// Upstream network link
#[allow(async_fn_in_trait)]
pub trait NetworkLink {
    /// Try to bring the link up, giving up after `budget`
    async fn associate(&mut self, budget: Duration) -> bool;

    /// Whether the link was usable at the last check
    fn connected(&self) -> bool;

    /// Re-check the link and return its current state
    async fn refresh(&mut self) -> bool {
        self.connected()
    }
}

/// Treats a successful TCP connect to a probe address as an active association
pub struct TcpProbeLink {
    probe_addr: String,
    connected: bool,
    recheck_interval: Duration,
    last_check: Option<Instant>,
}

impl TcpProbeLink {
    pub fn new(probe_addr: impl Into<String>) -> Self {
        Self {
            probe_addr: probe_addr.into(),
            connected: false,
            recheck_interval: RECHECK_INTERVAL,
            last_check: None,
        }
    }

    /// Re-check at most once per `interval`; zero checks on every refresh
    pub fn with_recheck_interval(mut self, interval: Duration) -> Self {
        self.recheck_interval = interval;
        self
    }

    async fn probe(&self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, TcpStream::connect(self.probe_addr.as_str())).await,
            Ok(Ok(_))
        )
    }
}

impl NetworkLink for TcpProbeLink {
    async fn associate(&mut self, budget: Duration) -> bool {
        info!("Connecting to network via {}", self.probe_addr);
        let deadline = Instant::now() + budget;
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            if self.probe(remaining).await {
                info!("Network up after {} attempt(s)", attempts);
                self.connected = true;
                self.last_check = Some(Instant::now());
                return true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(ASSOCIATION_RETRY.min(remaining)).await;
        }

        warn!(
            "Network association timed out after {:?}, continuing without cloud uploads",
            budget
        );
        self.connected = false;
        self.last_check = Some(Instant::now());
        false
    }

    fn connected(&self) -> bool {
        self.connected
    }

    async fn refresh(&mut self) -> bool {
        let due = match self.last_check {
            Some(at) => at.elapsed() >= self.recheck_interval,
            None => true,
        };
        if !due {
            return self.connected;
        }

        let up = self.probe(PROBE_TIMEOUT).await;
        self.last_check = Some(Instant::now());
        if up != self.connected {
            if up {
                info!("Network link to {} restored", self.probe_addr);
            } else {
                warn!("Network link to {} lost, uploads paused", self.probe_addr);
            }
        }
        self.connected = up;
        up
    }
}

/// Link whose state is flipped by the test
#[derive(Debug, Clone, Default)]
pub struct MockNetwork {
    up: Arc<AtomicBool>,
}

impl MockNetwork {
    pub fn new(up: bool) -> Self {
        Self {
            up: Arc::new(AtomicBool::new(up)),
        }
    }

    pub fn set_up(&self, up: bool) {
        self.up.store(up, Ordering::SeqCst);
    }
}

impl NetworkLink for MockNetwork {
    async fn associate(&mut self, _budget: Duration) -> bool {
        self.connected()
    }

    fn connected(&self) -> bool {
        self.up.load(Ordering::SeqCst)
    }
}
