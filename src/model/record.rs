use serde::{Deserialize, Serialize};

/// Latitude/longitude pair carried by one radio frame
///
/// Built fresh for every acquisition cycle on the transmitter and for every
/// accepted frame on the gateway. Never mutated after construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub latitude: f32,
    pub longitude: f32,
}

impl PositionRecord {
    pub fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both coordinates fall inside the WGS84 ranges
    pub fn is_plausible(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for PositionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_six_decimals() {
        let record = PositionRecord::new(43.7956, -79.35051);
        assert_eq!(record.to_string(), "43.795601, -79.350510");
    }

    #[test]
    fn test_plausibility() {
        assert!(PositionRecord::new(0.0, 0.0).is_plausible());
        assert!(PositionRecord::new(-90.0, 180.0).is_plausible());
        assert!(!PositionRecord::new(90.5, 0.0).is_plausible());
        assert!(!PositionRecord::new(0.0, f32::NAN).is_plausible());
    }
}
