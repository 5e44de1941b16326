//! Gateway node
//!
//! Receives position frames from the radio and relays them to cloud
//! telemetry endpoints, each behind its own rate-limit gate.

pub mod dispatcher;
pub mod network;
pub mod receiver;
pub mod sinks;
pub mod transport;

pub use dispatcher::{
    Destination, DestinationState, DispatchContext, DispatchReport, UploadDispatcher,
    UploadOutcome,
};
pub use network::{NetworkLink, TcpProbeLink};
pub use receiver::{ReceiveLoop, ReceiveOutcome, ReceivedFix};
pub use sinks::{AdafruitIoSink, ThingSpeakSink};
pub use transport::{HttpTransport, HyperTransport, UploadRequest};
