//! Datagram transport
//!
//! The correlator only needs a way to send bytes to an endpoint; inbound
//! datagrams are fed back through
//! [`ClientRequestCorrelator::handle_response`].

use crate::correlator::ClientRequestCorrelator;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use radius_proto::Packet;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Outbound side of a RADIUS transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one datagram to `endpoint`
    async fn send(&self, endpoint: SocketAddr, data: &[u8]) -> ClientResult<()>;
}

/// UDP transport over a single tokio socket
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    /// Bind a socket to the given local address
    pub async fn bind(addr: SocketAddr) -> ClientResult<Self> {
        let socket = UdpSocket::bind(addr).await?;
        debug!(local = %socket.local_addr()?, "RADIUS client socket bound");
        Ok(UdpTransport {
            socket: Arc::new(socket),
        })
    }

    /// Get the actual bound address
    ///
    /// Useful when binding to port 0 (OS-assigned port)
    pub fn local_addr(&self) -> ClientResult<SocketAddr> {
        self.socket.local_addr().map_err(ClientError::from)
    }

    /// Spawn the receive loop feeding datagrams to `correlator`
    ///
    /// The loop runs until the returned task is aborted.
    pub fn spawn_receiver(&self, correlator: ClientRequestCorrelator) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);

        tokio::spawn(async move {
            let mut buf = vec![0u8; Packet::MAX_PACKET_SIZE];

            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, source)) => {
                        correlator.handle_response(source, &buf[..len]);
                    }
                    Err(e) => {
                        // ICMP errors from earlier sends surface here on some platforms
                        warn!(error = %e, "UDP receive failed");
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send(&self, endpoint: SocketAddr, data: &[u8]) -> ClientResult<()> {
        let sent = self.socket.send_to(data, endpoint).await?;
        if sent != data.len() {
            return Err(ClientError::Transport(format!(
                "Short send to {}: {} of {} bytes",
                endpoint,
                sent,
                data.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_send() {
        let transport = UdpTransport::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        let peer = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let peer_addr = peer.local_addr().unwrap();

        transport.send(peer_addr, &[1, 2, 3]).await.unwrap();

        let mut buf = [0u8; 16];
        let (len, source) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], &[1, 2, 3]);
        assert_eq!(source, transport.local_addr().unwrap());
    }
}
