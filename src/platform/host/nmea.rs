use crate::error::{EltError, Result};
use crate::platform::traits::PositionStream;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Bytes per second delivered by a receiver on a 9600 8N1 link
const BYTES_PER_SEC: u64 = 960;

/// Replays an NMEA capture at serial line rate, looping at end of file
///
/// Without a capture file the stream stays silent, which is what a receiver
/// without an antenna looks like from the parser's side.
pub struct NmeaReplayStream {
    path: Option<PathBuf>,
    data: Vec<u8>,
    started_at: Option<Instant>,
    delivered: u64,
}

impl NmeaReplayStream {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            data: Vec::new(),
            started_at: None,
            delivered: 0,
        }
    }

    fn budget(&self) -> u64 {
        self.started_at
            .map(|t| t.elapsed().as_millis() as u64 * BYTES_PER_SEC / 1000)
            .unwrap_or(0)
    }
}

impl PositionStream for NmeaReplayStream {
    fn start(&mut self) -> Result<()> {
        if let Some(ref path) = self.path {
            self.data = std::fs::read(path).map_err(|e| {
                EltError::Platform(format!("cannot read NMEA capture {}: {}", path.display(), e))
            })?;
            info!(
                "Replaying {} bytes of NMEA from {}",
                self.data.len(),
                path.display()
            );
        } else {
            info!("No NMEA capture configured, position stream is silent");
        }
        self.started_at = Some(Instant::now());
        self.delivered = 0;
        Ok(())
    }

    fn read_byte(&mut self) -> Option<u8> {
        if self.data.is_empty() || self.delivered >= self.budget() {
            return None;
        }
        let byte = self.data[(self.delivered % self.data.len() as u64) as usize];
        self.delivered += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_silent_without_capture() {
        let mut stream = NmeaReplayStream::new(None);
        stream.start().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(stream.read_byte(), None);
    }

    #[test]
    fn test_replays_at_line_rate() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"$GPGGA\r\n").unwrap();

        let mut stream = NmeaReplayStream::new(Some(file.path().to_path_buf()));
        assert_eq!(stream.read_byte(), None);

        stream.start().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));

        // ~48 bytes are due after 50 ms, so the 8-byte capture wraps around
        let mut read = Vec::new();
        while let Some(b) = stream.read_byte() {
            read.push(b);
        }
        assert!(read.len() >= 16);
        assert_eq!(&read[..8], b"$GPGGA\r\n");
        assert_eq!(&read[8..16], b"$GPGGA\r\n");
    }

    #[test]
    fn test_missing_capture_is_platform_error() {
        let mut stream = NmeaReplayStream::new(Some(PathBuf::from("/nonexistent/capture.nmea")));
        assert!(matches!(stream.start(), Err(EltError::Platform(_))));
    }
}
