use crate::error::{EltError, Result};
use crate::model::LinkQuality;
use crate::platform::traits::{RadioReceiver, RadioTransmitter};
use std::net::{SocketAddr, UdpSocket};
use tracing::{debug, info, warn};

/// Largest LoRa payload
const MAX_PACKET_SIZE: usize = 255;

/// Transmit half of the UDP radio bridge: one datagram per packet
pub struct UdpRadio {
    bind_addr: SocketAddr,
    peer_addr: SocketAddr,
    socket: Option<UdpSocket>,
}

impl UdpRadio {
    pub fn new(bind_addr: SocketAddr, peer_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            peer_addr,
            socket: None,
        }
    }
}

impl RadioTransmitter for UdpRadio {
    fn begin(&mut self, frequency_hz: u64) -> Result<()> {
        let socket = UdpSocket::bind(self.bind_addr)
            .and_then(|s| s.connect(self.peer_addr).map(|_| s))
            .map_err(|e| EltError::Initialization(format!("UDP radio bridge: {}", e)))?;

        info!(
            "UDP radio up on {} -> {} ({} Hz channel)",
            self.bind_addr, self.peer_addr, frequency_hz
        );
        self.socket = Some(socket);
        Ok(())
    }

    fn send(&mut self, packet: &[u8]) -> Result<()> {
        let socket = self
            .socket
            .as_ref()
            .ok_or_else(|| EltError::Platform("radio not initialized".to_string()))?;
        socket.send(packet)?;
        Ok(())
    }
}

/// Receive half of the UDP radio bridge
///
/// A datagram has no RSSI, so every packet reports the configured nominal
/// signal strength.
pub struct UdpRadioReceiver {
    bind_addr: SocketAddr,
    nominal_rssi: i16,
    socket: Option<tokio::net::UdpSocket>,
    buffer: [u8; MAX_PACKET_SIZE],
    pending: Option<usize>,
    last_rssi: i16,
}

impl UdpRadioReceiver {
    pub fn new(bind_addr: SocketAddr, nominal_rssi: i16) -> Self {
        Self {
            bind_addr,
            nominal_rssi,
            socket: None,
            buffer: [0u8; MAX_PACKET_SIZE],
            pending: None,
            last_rssi: 0,
        }
    }

    /// Bound address once `begin` succeeded
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Must be called from inside a tokio runtime
    fn bind(&self) -> std::io::Result<tokio::net::UdpSocket> {
        let socket = UdpSocket::bind(self.bind_addr)?;
        socket.set_nonblocking(true)?;
        tokio::net::UdpSocket::from_std(socket)
    }
}

impl RadioReceiver for UdpRadioReceiver {
    fn begin(&mut self, frequency_hz: u64) -> Result<()> {
        let socket = self
            .bind()
            .map_err(|e| EltError::Initialization(format!("UDP radio bridge: {}", e)))?;
        info!(
            "UDP radio listening on {} ({} Hz channel)",
            self.bind_addr, frequency_hz
        );
        self.socket = Some(socket);
        Ok(())
    }

    async fn poll(&mut self) -> Option<usize> {
        if let Some(len) = self.pending {
            return Some(len);
        }
        let socket = self.socket.as_ref()?;
        match socket.recv_from(&mut self.buffer).await {
            Ok((len, from)) => {
                debug!("UDP radio: {} byte packet from {}", len, from);
                self.pending = Some(len);
                Some(len)
            }
            Err(e) => {
                warn!("UDP radio receive error: {}", e);
                None
            }
        }
    }

    fn read(&mut self, buffer: &mut [u8]) -> usize {
        match self.pending.take() {
            Some(len) => {
                let n = len.min(buffer.len());
                buffer[..n].copy_from_slice(&self.buffer[..n]);
                self.last_rssi = self.nominal_rssi;
                n
            }
            None => 0,
        }
    }

    fn signal_strength(&self) -> LinkQuality {
        LinkQuality::new(self.last_rssi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_bridge_round_trip() {
        let mut rx = UdpRadioReceiver::new("127.0.0.1:0".parse().unwrap(), -80);
        rx.begin(915_000_000).unwrap();
        let rx_addr = rx.local_addr().unwrap();

        let mut tx = UdpRadio::new("127.0.0.1:0".parse().unwrap(), rx_addr);
        tx.begin(915_000_000).unwrap();
        tx.send(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();

        assert_eq!(rx.poll().await, Some(8));
        // Polling again without reading reports the same packet
        assert_eq!(rx.poll().await, Some(8));

        let mut buf = [0u8; 8];
        assert_eq!(rx.read(&mut buf), 8);
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(rx.signal_strength(), LinkQuality::new(-80));
        assert_eq!(rx.read(&mut buf), 0);
    }

    #[test]
    fn test_send_before_begin_fails() {
        let mut tx = UdpRadio::new(
            "127.0.0.1:0".parse().unwrap(),
            "127.0.0.1:9".parse().unwrap(),
        );
        assert!(tx.send(&[0u8; 8]).is_err());
    }
}
