//! Position fix parsing (NMEA 0183)
//!
//! The parser accumulates bytes from the receiver and keeps the last valid
//! fix. Once a fix has been seen it stays valid for the rest of the active
//! session; void sentences do not clear it.

use nmea0183::{ParseResult, Parser};
use tracing::trace;

/// Latitude/longitude from the position receiver, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub latitude: f64,
    pub longitude: f64,
}

/// Accumulating parser over the receiver's byte stream
pub trait FixParser {
    /// Feed one byte from the receiver
    fn feed(&mut self, byte: u8);

    /// Last valid fix, if any has been decoded
    fn fix(&self) -> Option<Fix>;
}

/// NMEA 0183 parser taking positions from GGA and RMC sentences
pub struct NmeaFixParser {
    parser: Parser,
    fix: Option<Fix>,
}

impl NmeaFixParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            fix: None,
        }
    }
}

impl Default for NmeaFixParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FixParser for NmeaFixParser {
    fn feed(&mut self, byte: u8) {
        match self.parser.parse_from_byte(byte) {
            Some(Ok(ParseResult::GGA(Some(gga)))) => {
                self.fix = Some(Fix {
                    latitude: gga.latitude.as_f64(),
                    longitude: gga.longitude.as_f64(),
                });
            }
            Some(Ok(ParseResult::RMC(Some(rmc)))) => {
                self.fix = Some(Fix {
                    latitude: rmc.latitude.as_f64(),
                    longitude: rmc.longitude.as_f64(),
                });
            }
            Some(Err(e)) => {
                trace!("NMEA sentence rejected: {}", e);
            }
            // Void sentences and sentence types without a position
            _ => {}
        }
    }

    fn fix(&self) -> Option<Fix> {
        self.fix
    }
}
