//! Concrete cloud destinations

use super::dispatcher::Destination;
use super::transport::UploadRequest;
use crate::model::{LinkQuality, PositionRecord};
use serde::Serialize;
use std::time::Duration;

/// Round to the 6 decimal places the dashboards display
fn six_places(value: f32) -> f64 {
    (value as f64 * 1e6).round() / 1e6
}

/// Channel-update endpoint taking plain key-value query parameters
///
/// `GET /update?api_key=KEY&field1=LAT&field2=LON&field3=RSSI`
#[derive(Debug, Clone)]
pub struct ThingSpeakSink {
    pub host: String,
    pub port: u16,
    pub write_key: String,
    pub min_interval: Duration,
}

impl Destination for ThingSpeakSink {
    fn name(&self) -> &str {
        "thingspeak"
    }

    fn min_interval(&self) -> Duration {
        self.min_interval
    }

    fn build_request(&self, record: &PositionRecord, quality: LinkQuality) -> UploadRequest {
        let path = format!(
            "/update?api_key={}&field1={:.6}&field2={:.6}&field3={}",
            self.write_key,
            record.latitude,
            record.longitude,
            quality.rssi()
        );
        UploadRequest::get(&self.host, self.port, path)
    }
}

/// Body accepted by a location feed
#[derive(Debug, Serialize)]
struct LocationDatum {
    value: u8,
    lat: f64,
    lon: f64,
}

/// Location feed taking a JSON body and a key header
///
/// `POST /api/v2/USER/feeds/FEED/data` with `X-AIO-Key`
#[derive(Debug, Clone)]
pub struct AdafruitIoSink {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub key: String,
    pub feed: String,
    pub min_interval: Duration,
}

impl Destination for AdafruitIoSink {
    fn name(&self) -> &str {
        "adafruit-io"
    }

    fn min_interval(&self) -> Duration {
        self.min_interval
    }

    fn build_request(&self, record: &PositionRecord, _quality: LinkQuality) -> UploadRequest {
        let datum = LocationDatum {
            value: 0,
            lat: six_places(record.latitude),
            lon: six_places(record.longitude),
        };
        // Serializing three plain fields cannot fail
        let body = serde_json::to_string(&datum).unwrap_or_default();
        let path = format!("/api/v2/{}/feeds/{}/data", self.username, self.feed);

        UploadRequest::post_json(&self.host, self.port, path, body)
            .with_header("X-AIO-Key", &self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::transport::Method;

    fn record() -> PositionRecord {
        PositionRecord::new(43.7956, -79.35051)
    }

    #[test]
    fn test_thingspeak_request() {
        let sink = ThingSpeakSink {
            host: "api.thingspeak.com".into(),
            port: 80,
            write_key: "WRITEKEY".into(),
            min_interval: Duration::from_secs(16),
        };

        let req = sink.build_request(&record(), LinkQuality::new(-80));

        assert_eq!(req.method, Method::Get);
        assert_eq!(req.host, "api.thingspeak.com");
        assert_eq!(
            req.path,
            "/update?api_key=WRITEKEY&field1=43.795601&field2=-79.350510&field3=-80"
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn test_adafruit_request() {
        let sink = AdafruitIoSink {
            host: "io.adafruit.com".into(),
            port: 80,
            username: "elt-user".into(),
            key: "aio_key".into(),
            feed: "location".into(),
            min_interval: Duration::from_secs(2),
        };

        let req = sink.build_request(&record(), LinkQuality::new(-80));

        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, "/api/v2/elt-user/feeds/location/data");
        assert_eq!(req.header("X-AIO-Key"), Some("aio_key"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));

        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["value"], 0);
        assert_eq!(body["lat"].as_f64(), Some(43.795601));
        assert_eq!(body["lon"].as_f64(), Some(-79.35051));
    }

    #[test]
    fn test_adafruit_body_field_order() {
        let sink = AdafruitIoSink {
            host: "io.adafruit.com".into(),
            port: 80,
            username: "u".into(),
            key: "k".into(),
            feed: "location".into(),
            min_interval: Duration::from_secs(2),
        };
        let req = sink.build_request(&PositionRecord::new(1.5, -2.25), LinkQuality::new(0));
        assert_eq!(req.body.as_deref(), Some(r#"{"value":0,"lat":1.5,"lon":-2.25}"#));
    }
}
