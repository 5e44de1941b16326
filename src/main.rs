use anyhow::{Context, Result};
use eltlink::config::Config;
use eltlink::gateway::{HyperTransport, NetworkLink, ReceiveLoop, TcpProbeLink, UploadDispatcher};
use eltlink::platform::host::{SystemClock, UdpRadioReceiver};
use eltlink::platform::RadioReceiver;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eltlink=info".parse()?)
        )
        .json()
        .init();

    info!("Starting eltlink gateway v{}", eltlink::VERSION);

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    info!("Configuration loaded successfully");

    // Bring up the radio before anything else; without it there is nothing to relay
    let mut radio = UdpRadioReceiver::new(config.radio.bind_addr, config.radio.nominal_rssi);
    radio
        .begin(config.radio.frequency_hz)
        .context("Starting LoRa failed")?;

    // Bounded association: the gateway keeps receiving even when this fails
    let mut network = TcpProbeLink::new(config.gateway.probe_addr.clone());
    network
        .associate(config.gateway.association_timeout())
        .await;

    let transport = HyperTransport::new(config.gateway.request_timeout());
    let mut dispatcher = UploadDispatcher::new(transport);

    match config.gateway.adafruit_sink() {
        Some(sink) => {
            info!("Adafruit IO uploads enabled for feed {}", sink.feed);
            dispatcher.add_destination(Box::new(sink));
        }
        None => warn!("ELT_AIO_USERNAME or ELT_AIO_KEY not set, Adafruit IO uploads disabled"),
    }

    match config.gateway.thingspeak_sink() {
        Some(sink) => {
            info!("ThingSpeak uploads enabled on {}", sink.host);
            dispatcher.add_destination(Box::new(sink));
        }
        None => warn!("ELT_THINGSPEAK_WRITE_KEY not set, ThingSpeak uploads disabled"),
    }

    let receive_loop = ReceiveLoop::new(radio, network, dispatcher, SystemClock::new());

    info!("eltlink gateway started successfully");

    // Receive until SIGINT or SIGTERM
    tokio::select! {
        _ = receive_loop.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("SIGINT received, shutting down");
        }
        _ = terminate() => {
            info!("SIGTERM received, shutting down");
        }
    }

    info!("eltlink gateway shutdown complete");

    Ok(())
}

#[cfg(unix)]
async fn terminate() {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to register SIGTERM handler: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
