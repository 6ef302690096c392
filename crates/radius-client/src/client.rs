//! UDP RADIUS client
//!
//! Binds a [`UdpTransport`], runs its receive loop and routes every request
//! through a [`ClientRequestCorrelator`].

use crate::config::ClientConfig;
use crate::correlator::{ClientRequestCorrelator, PendingRequest};
use crate::error::ClientResult;
use crate::stats::CorrelatorStatsSnapshot;
use crate::transport::UdpTransport;
use radius_proto::{Dictionary, Packet};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct RadiusClient {
    transport: Arc<UdpTransport>,
    correlator: ClientRequestCorrelator,
    receiver: JoinHandle<()>,
}

impl RadiusClient {
    /// Bind the client socket and start receiving responses
    pub async fn bind(config: &ClientConfig, dictionary: Arc<dyn Dictionary>) -> ClientResult<Self> {
        config.validate()?;

        let transport = Arc::new(UdpTransport::bind(config.bind_addr()?).await?);
        let correlator =
            ClientRequestCorrelator::new(config.correlator_config(), dictionary, transport.clone());
        let receiver = transport.spawn_receiver(correlator.clone());

        info!(
            local = %transport.local_addr()?,
            timeout_ms = config.timeout_ms,
            max_retries = config.max_retries,
            "RADIUS client started"
        );

        Ok(RadiusClient {
            transport,
            correlator,
            receiver,
        })
    }

    /// Send a request and wait for its response
    ///
    /// A free identifier is assigned for `endpoint`.
    pub async fn send(&self, packet: Packet, endpoint: SocketAddr) -> ClientResult<Packet> {
        self.correlator.submit(packet, endpoint).await?.await
    }

    /// Send a request, returning a handle instead of waiting
    pub async fn submit(&self, packet: Packet, endpoint: SocketAddr) -> ClientResult<PendingRequest> {
        self.correlator.submit(packet, endpoint).await
    }

    pub fn local_addr(&self) -> ClientResult<SocketAddr> {
        self.transport.local_addr()
    }

    pub fn correlator(&self) -> &ClientRequestCorrelator {
        &self.correlator
    }

    pub fn stats(&self) -> CorrelatorStatsSnapshot {
        self.correlator.stats()
    }

    /// Stop receiving and cancel all pending requests
    pub fn shutdown(&self) -> usize {
        self.receiver.abort();
        self.correlator.shutdown()
    }
}

impl Drop for RadiusClient {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}
