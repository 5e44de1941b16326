use serde::{Deserialize, Serialize};

/// RSSI in dBm
pub type Rssi = i16;

/// Received signal strength attached to one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkQuality(pub Rssi);

impl LinkQuality {
    pub fn new(rssi: Rssi) -> Self {
        Self(rssi)
    }

    pub fn rssi(&self) -> Rssi {
        self.0
    }
}

impl std::fmt::Display for LinkQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} dBm", self.0)
    }
}
