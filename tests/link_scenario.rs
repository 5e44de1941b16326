//! Transmitter and gateway wired together through the mock and UDP radios

use eltlink::codec;
use eltlink::gateway::network::MockNetwork;
use eltlink::gateway::transport::MockTransport;
use eltlink::gateway::{
    AdafruitIoSink, ReceiveLoop, ReceiveOutcome, ThingSpeakSink, UploadDispatcher, UploadOutcome,
};
use eltlink::model::{PositionRecord, WakeCause};
use eltlink::platform::host::{UdpRadio, UdpRadioReceiver};
use eltlink::platform::mock::{
    MockClock, MockPin, MockPositionStream, MockRadio, MockRadioReceiver, MockWake,
};
use eltlink::platform::{OutputPin, PinLevel, RadioReceiver, RadioTransmitter};
use eltlink::transmitter::{
    AcquisitionConfig, BootOutcome, FixSource, NmeaFixParser, PowerController, PowerGate,
    SleepReason, Transmitter,
};
use std::time::Duration;

const TS_HOST: &str = "api.thingspeak.com";
const AIO_HOST: &str = "io.adafruit.com";

fn dispatcher(transport: MockTransport) -> UploadDispatcher<MockTransport> {
    UploadDispatcher::new(transport)
        .with_destination(Box::new(AdafruitIoSink {
            host: AIO_HOST.into(),
            port: 80,
            username: "user".into(),
            key: "aio-key".into(),
            feed: "location".into(),
            min_interval: Duration::from_secs(2),
        }))
        .with_destination(Box::new(ThingSpeakSink {
            host: TS_HOST.into(),
            port: 80,
            write_key: "ts-key".into(),
            min_interval: Duration::from_secs(16),
        }))
}

#[tokio::test]
async fn test_triggered_transmitter_feeds_gateway() {
    let pin = MockPin::new();
    let wake = MockWake::new(WakeCause::Trigger);
    let stream = MockPositionStream::new();
    let radio = MockRadio::new();
    stream.inject(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n");

    let mut tx = Transmitter::new(
        PowerController::new(PowerGate::new(pin.clone(), 150), 915_000_000),
        wake.clone(),
        stream.clone(),
        radio.clone(),
        NmeaFixParser::new(),
        MockClock::new(),
        AcquisitionConfig::default(),
    );
    assert_eq!(tx.boot(), BootOutcome::Active);
    assert_eq!(pin.level(), PinLevel::Low);
    assert_eq!(radio.frequency_hz(), Some(915_000_000));

    let mut acquisition = tx.into_loop();
    let sent: Vec<_> = (0..9).map(|_| acquisition.cycle()).collect();
    assert!(sent.iter().all(|t| t.source == FixSource::Gps));

    // Gateway clock runs from the first frame
    let gateway_clock = MockClock::new();
    let rx = MockRadioReceiver::new();
    let mut rx_handle = rx.clone();
    rx_handle.begin(915_000_000).unwrap();
    let transport = MockTransport::new();
    let mut gateway = ReceiveLoop::new(
        rx.clone(),
        MockNetwork::new(true),
        dispatcher(transport.clone()),
        gateway_clock.clone(),
    );

    let origin = sent[0].sent_at_ms;
    for (frame, transmission) in radio.sent().iter().zip(&sent) {
        gateway_clock.set(transmission.sent_at_ms - origin);
        rx.inject(frame, -97);
        match gateway.poll_once().await {
            ReceiveOutcome::Forwarded(fix) => {
                assert_eq!(fix.record, transmission.record);
                assert_eq!(fix.quality.rssi(), -97);
            }
            other => panic!("expected a forwarded fix, got {:?}", other),
        }
    }

    // Frames land every 3 s: Adafruit IO takes all nine, ThingSpeak opens at 0 s and 18 s
    assert_eq!(transport.attempts_to(AIO_HOST), 9);
    assert_eq!(transport.attempts_to(TS_HOST), 2);
    assert_eq!(gateway.stats().forwarded, 9);

    let first = codec::decode(&radio.sent()[0]).unwrap();
    assert!((first.latitude - 48.1173).abs() < 1e-4);
    assert!((first.longitude - 11.516666).abs() < 1e-4);
}

#[test]
fn test_cold_start_touches_nothing() {
    let pin = MockPin::new();
    let wake = MockWake::new(WakeCause::Reset);
    let stream = MockPositionStream::new();
    let radio = MockRadio::new();

    let mut tx = Transmitter::new(
        PowerController::new(PowerGate::new(pin.clone(), 150), 915_000_000),
        wake.clone(),
        stream.clone(),
        radio.clone(),
        NmeaFixParser::new(),
        MockClock::new(),
        AcquisitionConfig::default(),
    );

    assert_eq!(tx.boot(), BootOutcome::Sleep(SleepReason::ColdStart));
    assert!(wake.is_armed());
    assert_eq!(pin.history(), vec![PinLevel::High]);
    assert!(!stream.is_started());
    assert_eq!(radio.begin_calls(), 0);
    assert!(radio.sent().is_empty());
}

#[test]
fn test_radio_failure_powers_gate_on_then_off() {
    let pin = MockPin::new();
    let wake = MockWake::new(WakeCause::Trigger);
    let radio = MockRadio::failing();
    let clock = MockClock::new();

    let mut tx = Transmitter::new(
        PowerController::new(PowerGate::new(pin.clone(), 150), 915_000_000),
        wake,
        MockPositionStream::new(),
        radio.clone(),
        NmeaFixParser::new(),
        clock.clone(),
        AcquisitionConfig::default(),
    );

    assert!(matches!(
        tx.boot(),
        BootOutcome::Sleep(SleepReason::RadioInitFailed(_))
    ));
    assert_eq!(
        pin.history(),
        vec![PinLevel::High, PinLevel::Low, PinLevel::High]
    );
    assert_eq!(clock.delays(), vec![150]);
    assert!(radio.sent().is_empty());
}

#[tokio::test]
async fn test_offline_gateway_keeps_receiving() {
    let rx = MockRadioReceiver::new();
    let mut rx_handle = rx.clone();
    rx_handle.begin(915_000_000).unwrap();
    let network = MockNetwork::new(false);
    let transport = MockTransport::new();
    let clock = MockClock::new();
    let mut gateway = ReceiveLoop::new(
        rx.clone(),
        network.clone(),
        dispatcher(transport.clone()),
        clock.clone(),
    );

    let frame = codec::encode(&PositionRecord::new(43.79560, -79.35051));
    rx.inject(&frame, -80);
    match gateway.poll_once().await {
        ReceiveOutcome::Forwarded(fix) => {
            assert_eq!(fix.report.outcome("thingspeak"), Some(&UploadOutcome::Offline));
            assert_eq!(fix.report.outcome("adafruit-io"), Some(&UploadOutcome::Offline));
        }
        other => panic!("expected a forwarded fix, got {:?}", other),
    }
    assert!(transport.attempts().is_empty());

    // Back online: both gates are still open
    network.set_up(true);
    clock.set(30_000);
    rx.inject(&frame, -80);
    gateway.poll_once().await;
    assert_eq!(transport.attempts_to(TS_HOST), 1);
    assert_eq!(transport.attempts_to(AIO_HOST), 1);
}

#[tokio::test]
async fn test_udp_bridge_end_to_end() {
    let mut rx = UdpRadioReceiver::new("127.0.0.1:0".parse().unwrap(), -80);
    rx.begin(915_000_000).unwrap();
    let rx_addr = rx.local_addr().unwrap();

    let transport = MockTransport::new();
    let mut gateway = ReceiveLoop::new(
        rx,
        MockNetwork::new(true),
        dispatcher(transport.clone()),
        MockClock::new(),
    );

    let mut tx = UdpRadio::new("127.0.0.1:0".parse().unwrap(), rx_addr);
    tx.begin(915_000_000).unwrap();

    // A stray packet of the wrong size is dropped, the real frame goes through
    tx.send(&[0xAA; 5]).unwrap();
    let record = PositionRecord::new(-33.8688, 151.2093);
    tx.send(&codec::encode(&record)).unwrap();

    assert!(matches!(
        gateway.poll_once().await,
        ReceiveOutcome::Discarded { len: 5 }
    ));
    match gateway.poll_once().await {
        ReceiveOutcome::Forwarded(fix) => {
            assert_eq!(fix.record, record);
            assert_eq!(fix.quality.rssi(), -80);
        }
        other => panic!("expected a forwarded fix, got {:?}", other),
    }

    let requests = transport.attempts();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].host, AIO_HOST);
    assert_eq!(requests[1].host, TS_HOST);
    assert!(requests[1].path.contains("field1=-33.868801"));
}
