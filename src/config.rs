use crate::error::EltError;
use crate::gateway::sinks::{AdafruitIoSink, ThingSpeakSink};
use crate::model::PositionRecord;
use crate::platform::host::TriggerMode;
use crate::transmitter::AcquisitionConfig;
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub radio: RadioConfig,
    pub transmitter: TransmitterConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone)]
pub struct RadioConfig {
    pub frequency_hz: u64,
    /// Local end of the UDP radio bridge
    pub bind_addr: SocketAddr,
    /// Where the transmitter sends its datagrams
    pub peer_addr: SocketAddr,
    /// Reported for every bridged packet, which carries no RSSI of its own
    pub nominal_rssi: i16,
}

#[derive(Debug, Clone)]
pub struct TransmitterConfig {
    pub fallback_lat: f32,
    pub fallback_lon: f32,
    pub sample_window_ms: u64,
    pub tx_interval_ms: u64,
    pub settle_delay_ms: u64,
    pub nmea_file: Option<PathBuf>,
    pub trigger: TriggerMode,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub probe_addr: String,
    pub association_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub thingspeak: ThingSpeakConfig,
    pub adafruit: AdafruitConfig,
}

#[derive(Debug, Clone)]
pub struct ThingSpeakConfig {
    pub host: String,
    pub port: u16,
    pub write_key: Option<String>,
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone)]
pub struct AdafruitConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub key: Option<String>,
    pub feed: String,
    pub min_interval_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let radio = RadioConfig {
            frequency_hz: parse_env("ELT_RADIO_FREQUENCY_HZ", 915_000_000)?,
            bind_addr: parse_env(
                "ELT_RADIO_BIND_ADDR",
                "0.0.0.0:1700".parse().context("Invalid default bind address")?,
            )?,
            peer_addr: parse_env(
                "ELT_RADIO_PEER_ADDR",
                "127.0.0.1:1700".parse().context("Invalid default peer address")?,
            )?,
            nominal_rssi: parse_env("ELT_RADIO_NOMINAL_RSSI", -80)?,
        };

        // Trigger source for the host transmitter: "button" (stdin) or "auto[:ms]"
        let trigger = match env::var("ELT_TX_TRIGGER") {
            Ok(value) => parse_trigger(&value)?,
            Err(_) => TriggerMode::Console,
        };

        let transmitter = TransmitterConfig {
            fallback_lat: parse_env("ELT_TX_FALLBACK_LAT", 43.79560)?,
            fallback_lon: parse_env("ELT_TX_FALLBACK_LON", -79.35051)?,
            sample_window_ms: parse_env("ELT_TX_SAMPLE_WINDOW_MS", 1000)?,
            tx_interval_ms: parse_env("ELT_TX_INTERVAL_MS", 2000)?,
            settle_delay_ms: parse_env("ELT_TX_SETTLE_DELAY_MS", 150)?,
            nmea_file: env::var("ELT_TX_NMEA_FILE").ok().map(PathBuf::from),
            trigger,
        };

        let thingspeak = ThingSpeakConfig {
            host: env::var("ELT_THINGSPEAK_HOST")
                .unwrap_or_else(|_| "api.thingspeak.com".to_string()),
            port: parse_env("ELT_THINGSPEAK_PORT", 80)?,
            write_key: non_empty_var("ELT_THINGSPEAK_WRITE_KEY"),
            min_interval_ms: parse_env("ELT_THINGSPEAK_MIN_INTERVAL_MS", 16_000)?,
        };

        let adafruit = AdafruitConfig {
            host: env::var("ELT_AIO_HOST").unwrap_or_else(|_| "io.adafruit.com".to_string()),
            port: parse_env("ELT_AIO_PORT", 80)?,
            username: non_empty_var("ELT_AIO_USERNAME"),
            key: non_empty_var("ELT_AIO_KEY"),
            feed: env::var("ELT_AIO_FEED").unwrap_or_else(|_| "location".to_string()),
            min_interval_ms: parse_env("ELT_AIO_MIN_INTERVAL_MS", 2_000)?,
        };

        let gateway = GatewayConfig {
            probe_addr: env::var("ELT_GATEWAY_PROBE_ADDR")
                .unwrap_or_else(|_| format!("{}:{}", thingspeak.host, thingspeak.port)),
            association_timeout_secs: parse_env("ELT_GATEWAY_ASSOCIATION_TIMEOUT_SECS", 20)?,
            request_timeout_secs: parse_env("ELT_GATEWAY_REQUEST_TIMEOUT_SECS", 10)?,
            thingspeak,
            adafruit,
        };

        Ok(Config {
            radio,
            transmitter,
            gateway,
        })
    }

    pub fn validate(&self) -> Result<()> {
        let fallback = self.transmitter.fallback();
        if !fallback.is_plausible() {
            return Err(EltError::Config(format!(
                "Fallback position out of range: {}",
                fallback
            ))
            .into());
        }

        if self.transmitter.sample_window_ms == 0 {
            return Err(EltError::Config(
                "ELT_TX_SAMPLE_WINDOW_MS must be greater than 0".to_string(),
            )
            .into());
        }

        if self.transmitter.tx_interval_ms == 0 {
            return Err(EltError::Config(
                "ELT_TX_INTERVAL_MS must be greater than 0".to_string(),
            )
            .into());
        }

        if self.gateway.thingspeak.min_interval_ms == 0 || self.gateway.adafruit.min_interval_ms == 0
        {
            return Err(EltError::Config(
                "Upload intervals must be greater than 0".to_string(),
            )
            .into());
        }

        if self.gateway.request_timeout_secs == 0 {
            return Err(EltError::Config(
                "ELT_GATEWAY_REQUEST_TIMEOUT_SECS must be greater than 0".to_string(),
            )
            .into());
        }

        // Credentials end up in a query string, a URI path and a header verbatim
        if let Some(ref key) = self.gateway.thingspeak.write_key {
            if !key.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(EltError::Config(
                    "ELT_THINGSPEAK_WRITE_KEY must be ASCII letters and digits".to_string(),
                )
                .into());
            }
        }

        let aio = &self.gateway.adafruit;
        let path_segments = aio.username.iter().chain(std::iter::once(&aio.feed));
        for segment in path_segments {
            if !is_path_segment(segment) {
                return Err(EltError::Config(format!(
                    "Adafruit IO username and feed may only contain letters, digits, '-' and '_', got '{}'",
                    segment
                ))
                .into());
            }
        }

        if let Some(ref key) = aio.key {
            if !key.chars().all(|c| c.is_ascii_graphic()) {
                return Err(EltError::Config(
                    "ELT_AIO_KEY must be printable ASCII without spaces".to_string(),
                )
                .into());
            }
        }

        if let Some(ref path) = self.transmitter.nmea_file {
            if !path.exists() {
                return Err(EltError::Config(format!(
                    "NMEA capture not found: {:?}",
                    path
                ))
                .into());
            }
        }

        Ok(())
    }
}

impl TransmitterConfig {
    pub fn fallback(&self) -> PositionRecord {
        PositionRecord::new(self.fallback_lat, self.fallback_lon)
    }

    pub fn acquisition(&self) -> AcquisitionConfig {
        AcquisitionConfig {
            sample_window_ms: self.sample_window_ms,
            tx_interval_ms: self.tx_interval_ms,
            fallback: self.fallback(),
        }
    }
}

impl GatewayConfig {
    pub fn association_timeout(&self) -> Duration {
        Duration::from_secs(self.association_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` when no write key is configured
    pub fn thingspeak_sink(&self) -> Option<ThingSpeakSink> {
        let ts = &self.thingspeak;
        ts.write_key.as_ref().map(|key| ThingSpeakSink {
            host: ts.host.clone(),
            port: ts.port,
            write_key: key.clone(),
            min_interval: Duration::from_millis(ts.min_interval_ms),
        })
    }

    /// `None` unless both username and key are configured
    pub fn adafruit_sink(&self) -> Option<AdafruitIoSink> {
        let aio = &self.adafruit;
        match (&aio.username, &aio.key) {
            (Some(username), Some(key)) => Some(AdafruitIoSink {
                host: aio.host.clone(),
                port: aio.port,
                username: username.clone(),
                key: key.clone(),
                feed: aio.feed.clone(),
                min_interval: Duration::from_millis(aio.min_interval_ms),
            }),
            _ => None,
        }
    }
}

fn parse_trigger(value: &str) -> Result<TriggerMode> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("button") {
        return Ok(TriggerMode::Console);
    }

    match value.split_once(':') {
        Some((mode, ms)) if mode.eq_ignore_ascii_case("auto") => {
            let ms: u64 = ms
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Failed to parse ELT_TX_TRIGGER delay: {}", e))?;
            Ok(TriggerMode::Auto(Duration::from_millis(ms)))
        }
        None if value.eq_ignore_ascii_case("auto") => {
            Ok(TriggerMode::Auto(Duration::from_secs(5)))
        }
        _ => Err(EltError::Config(format!(
            "ELT_TX_TRIGGER must be 'button', 'auto' or 'auto:<ms>', got '{}'",
            value
        ))
        .into()),
    }
}

fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    env::var(key)
        .ok()
        .map(|s| {
            s.parse().map_err(|e| {
                anyhow::anyhow!("Failed to parse {}: {}", key, e)
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}
