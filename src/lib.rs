pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod platform;
pub mod transmitter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
