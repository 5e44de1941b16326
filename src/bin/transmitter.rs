use anyhow::Result;
use eltlink::config::Config;
use eltlink::platform::host::{ConsoleWake, LoggedPin, NmeaReplayStream, SystemClock, UdpRadio};
use eltlink::transmitter::{NmeaFixParser, PowerController, PowerGate, Transmitter};
use std::net::SocketAddr;
use tracing::info;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eltlink=info".parse()?)
        )
        .json()
        .init();

    info!("Starting eltlink transmitter v{}", eltlink::VERSION);

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    let tx = &config.transmitter;
    match tx.nmea_file {
        Some(ref path) => info!("Replaying NMEA capture {}", path.display()),
        None => info!("No NMEA capture configured, every cycle will use the fallback position"),
    }

    // The transmitter side of the bridge binds an ephemeral port
    let local: SocketAddr = if config.radio.peer_addr.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };

    let gate = PowerGate::new(LoggedPin::new("gps-power"), tx.settle_delay_ms);
    let transmitter = Transmitter::new(
        PowerController::new(gate, config.radio.frequency_hz),
        ConsoleWake::new(tx.trigger),
        NmeaReplayStream::new(tx.nmea_file.clone()),
        UdpRadio::new(local, config.radio.peer_addr),
        NmeaFixParser::new(),
        SystemClock::new(),
        tx.acquisition(),
    );

    match transmitter.run() {
        Ok(never) => match never {},
        Err(e) => {
            info!("Transmitter stopped: {}", e);
            Ok(())
        }
    }
}
