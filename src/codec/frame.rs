use crate::error::{EltError, Result};
use crate::model::PositionRecord;

/// Size of one position frame on air
pub const FRAME_LEN: usize = 8;

/// Frame layout (no header, no version tag, no checksum):
/// - Latitude (4 bytes): IEEE-754 binary32, little-endian
/// - Longitude (4 bytes): IEEE-754 binary32, little-endian
///
/// Little-endian matches the in-memory layout of the ESP32 firmware that
/// shares this channel, so both ends agree without negotiation.
pub fn encode(record: &PositionRecord) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0..4].copy_from_slice(&record.latitude.to_le_bytes());
    frame[4..8].copy_from_slice(&record.longitude.to_le_bytes());
    frame
}

/// Decode a frame. Any 8-byte input decodes, including corrupted ones.
pub fn decode(bytes: &[u8]) -> Result<PositionRecord> {
    let frame: &[u8; FRAME_LEN] = bytes.try_into().map_err(|_| EltError::Format {
        expected: FRAME_LEN,
        actual: bytes.len(),
    })?;

    let latitude = f32::from_le_bytes([frame[0], frame[1], frame[2], frame[3]]);
    let longitude = f32::from_le_bytes([frame[4], frame[5], frame[6], frame[7]]);

    Ok(PositionRecord::new(latitude, longitude))
}
