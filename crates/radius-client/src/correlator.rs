//! Request/response correlation
//!
//! Each submitted request gets a pending entry keyed by (endpoint,
//! identifier) and a supervisor task that retransmits the identical bytes
//! whenever the per-attempt deadline expires. The request resolves exactly
//! once: on the first matching response, when the retry budget runs out,
//! or on cancellation. Resolution is whoever removes the pending entry
//! from the table.

use crate::error::{ClientError, ClientResult};
use crate::pending::{PendingEntry, PendingKey, PendingOutcome, PendingTable};
use crate::stats::{CorrelatorStats, CorrelatorStatsSnapshot};
use crate::transport::Transport;
use radius_proto::{Dictionary, Packet};
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// Maximum number of requests in flight unless configured otherwise
pub const DEFAULT_MAX_PENDING: usize = 1024;

/// Retry policy and capacity for a correlator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatorConfig {
    /// Time to wait for a response to each attempt
    pub timeout: Duration,
    /// Retransmissions before giving up
    pub max_retries: u32,
    /// Maximum number of pending requests
    pub max_pending: usize,
}

impl CorrelatorConfig {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        CorrelatorConfig {
            timeout,
            max_retries,
            max_pending: DEFAULT_MAX_PENDING,
        }
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }
}

struct Inner {
    dictionary: Arc<dyn Dictionary>,
    transport: Arc<dyn Transport>,
    pending: PendingTable,
    config: CorrelatorConfig,
    stats: CorrelatorStats,
    next_serial: AtomicU64,
    shut_down: AtomicBool,
}

/// Matches responses to outstanding requests and drives retransmission
///
/// Cloning yields another handle to the same correlator.
#[derive(Clone)]
pub struct ClientRequestCorrelator {
    inner: Arc<Inner>,
}

impl ClientRequestCorrelator {
    pub fn new(
        config: CorrelatorConfig,
        dictionary: Arc<dyn Dictionary>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        ClientRequestCorrelator {
            inner: Arc::new(Inner {
                dictionary,
                transport,
                pending: PendingTable::new(config.max_pending),
                config,
                stats: CorrelatorStats::default(),
                next_serial: AtomicU64::new(0),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Submit a request, assigning it a free identifier for `endpoint`
    ///
    /// The packet's own identifier is replaced. Returns once the first
    /// attempt has been handed to the transport.
    pub async fn submit(&self, packet: Packet, endpoint: SocketAddr) -> ClientResult<PendingRequest> {
        self.submit_inner(packet, endpoint, None).await
    }

    /// Submit a request keeping the identifier already set on the packet
    ///
    /// Fails with [`ClientError::IdentifierInUse`] if a request to
    /// `endpoint` with that identifier is still pending.
    pub async fn submit_with_identifier(
        &self,
        packet: Packet,
        endpoint: SocketAddr,
    ) -> ClientResult<PendingRequest> {
        let identifier = packet.identifier;
        self.submit_inner(packet, endpoint, Some(identifier)).await
    }

    async fn submit_inner(
        &self,
        packet: Packet,
        endpoint: SocketAddr,
        identifier: Option<u8>,
    ) -> ClientResult<PendingRequest> {
        let inner = &self.inner;
        if inner.shut_down.load(Ordering::Acquire) {
            return Err(ClientError::Shutdown);
        }

        let encoded = packet.encode()?;
        let serial = inner.next_serial.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        let deadline = Instant::now() + inner.config.timeout;

        let build = move |id: u8| {
            let mut bytes = encoded;
            bytes[1] = id;
            PendingEntry::new(Arc::from(bytes), deadline, serial, sender)
        };

        let (identifier, request) = match identifier {
            Some(id) => (id, inner.pending.insert(endpoint, id, build)?),
            None => inner.pending.insert_next(endpoint, build)?,
        };
        let key = (endpoint, identifier);

        // A shutdown that drained the table before our insert would miss us
        if inner.shut_down.load(Ordering::Acquire) {
            inner.pending.remove_if_serial(&key, serial);
            return Err(ClientError::Shutdown);
        }

        // The handle owns the entry from here on; dropping this future while
        // the send is in flight cancels it
        let handle = PendingRequest {
            receiver,
            inner: Arc::clone(inner),
            key,
            serial,
            finished: false,
        };

        if let Err(e) = inner.transport.send(endpoint, &request).await {
            inner.pending.remove_if_serial(&key, serial);
            return Err(e);
        }

        inner.stats.record_request();
        debug!(
            endpoint = %endpoint,
            identifier = identifier,
            code = ?packet.code,
            "Request sent"
        );

        tokio::spawn(supervise(Arc::clone(inner), key, serial));

        Ok(handle)
    }

    /// Feed an inbound datagram from `source`
    ///
    /// Returns true if it resolved a pending request. Datagrams that do not
    /// decode, carry a request code or match no pending entry are dropped.
    pub fn handle_response(&self, source: SocketAddr, data: &[u8]) -> bool {
        let inner = &self.inner;

        let response = match Packet::decode(inner.dictionary.as_ref(), data) {
            Ok(packet) => packet,
            Err(e) => {
                inner.stats.record_unsolicited();
                warn!(source = %source, error = %e, "Dropping malformed response");
                return false;
            }
        };

        if response.code.is_request() {
            inner.stats.record_unsolicited();
            debug!(source = %source, code = ?response.code, "Dropping request received on client socket");
            return false;
        }

        let key = (source, response.identifier);
        let Some(entry) = inner.pending.remove(&key) else {
            inner.stats.record_unsolicited();
            debug!(
                source = %source,
                identifier = response.identifier,
                "Dropping unsolicited response"
            );
            return false;
        };

        inner.stats.record_response();
        debug!(
            source = %source,
            identifier = response.identifier,
            code = ?response.code,
            retries = entry.retries,
            "Response matched"
        );
        entry.resolve(Ok(response));
        true
    }

    /// Cancel every pending request and refuse new ones
    ///
    /// Returns the number of requests cancelled.
    pub fn shutdown(&self) -> usize {
        let inner = &self.inner;
        inner.shut_down.store(true, Ordering::Release);

        let drained = inner.pending.drain();
        let count = drained.len();
        for (_, entry) in drained {
            inner.stats.record_cancellation();
            entry.resolve(Err(ClientError::Cancelled));
        }

        info!(cancelled = count, "Correlator shut down");
        count
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shut_down.load(Ordering::Acquire)
    }

    /// Number of requests awaiting a response
    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn config(&self) -> CorrelatorConfig {
        self.inner.config
    }

    pub fn stats(&self) -> CorrelatorStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

enum Expiry {
    Retransmit(Arc<[u8]>, u32),
    Exhausted,
}

/// Retransmit on each expired deadline until the entry is resolved
async fn supervise(inner: Arc<Inner>, key: PendingKey, serial: u64) {
    let (endpoint, identifier) = key;
    let timeout = inner.config.timeout;
    let max_retries = inner.config.max_retries;

    loop {
        let Some(deadline) = inner.pending.deadline(&key, serial) else {
            return;
        };
        time::sleep_until(deadline).await;

        let expiry = inner.pending.update(&key, serial, |entry| {
            if entry.retries < max_retries {
                entry.retries += 1;
                entry.deadline = Instant::now() + timeout;
                Expiry::Retransmit(Arc::clone(&entry.request), entry.retries)
            } else {
                Expiry::Exhausted
            }
        });

        match expiry {
            None => return,
            Some(Expiry::Retransmit(request, attempt)) => {
                inner.stats.record_retransmission();
                debug!(
                    endpoint = %endpoint,
                    identifier = identifier,
                    attempt = attempt,
                    "Retransmitting request"
                );
                if let Err(e) = inner.transport.send(endpoint, &request).await {
                    warn!(
                        endpoint = %endpoint,
                        identifier = identifier,
                        error = %e,
                        "Retransmission failed"
                    );
                }
            }
            Some(Expiry::Exhausted) => {
                if let Some(entry) = inner.pending.remove_if_serial(&key, serial) {
                    inner.stats.record_timeout();
                    info!(
                        endpoint = %endpoint,
                        identifier = identifier,
                        retries = entry.retries,
                        "Request timed out"
                    );
                    let retries = entry.retries;
                    entry.resolve(Err(ClientError::Timeout {
                        endpoint,
                        identifier,
                        retries,
                    }));
                }
                return;
            }
        }
    }
}

/// Handle to one submitted request
///
/// Awaiting it yields the matched response or the failure that ended the
/// request. Dropping it before completion cancels the request.
pub struct PendingRequest {
    receiver: oneshot::Receiver<PendingOutcome>,
    inner: Arc<Inner>,
    key: PendingKey,
    serial: u64,
    finished: bool,
}

impl PendingRequest {
    pub fn endpoint(&self) -> SocketAddr {
        self.key.0
    }

    /// Identifier the request was sent with
    pub fn identifier(&self) -> u8 {
        self.key.1
    }

    /// Cancel the request if it is still pending
    ///
    /// Returns true if this call cancelled it; the handle then resolves to
    /// [`ClientError::Cancelled`]. Later responses for the key are treated
    /// as unsolicited.
    pub fn cancel(&self) -> bool {
        let Some(entry) = self.inner.pending.remove_if_serial(&self.key, self.serial) else {
            return false;
        };
        self.inner.stats.record_cancellation();
        debug!(
            endpoint = %self.key.0,
            identifier = self.key.1,
            "Request cancelled"
        );
        entry.resolve(Err(ClientError::Cancelled));
        true
    }
}

impl Future for PendingRequest {
    type Output = ClientResult<Packet>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(outcome) => {
                self.finished = true;
                Poll::Ready(outcome.unwrap_or(Err(ClientError::Cancelled)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use radius_proto::{Code, MemoryDictionary};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(SocketAddr, Vec<u8>)>>,
    }

    impl RecordingTransport {
        fn sent(&self) -> Vec<(SocketAddr, Vec<u8>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, endpoint: SocketAddr, data: &[u8]) -> ClientResult<()> {
            self.sent.lock().unwrap().push((endpoint, data.to_vec()));
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _endpoint: SocketAddr, _data: &[u8]) -> ClientResult<()> {
            Err(ClientError::Transport("unreachable".to_string()))
        }
    }

    /// Stalls its first send for ten seconds
    #[derive(Default)]
    struct StallingTransport {
        stalled: AtomicBool,
        sends: AtomicU64,
    }

    #[async_trait]
    impl Transport for StallingTransport {
        async fn send(&self, _endpoint: SocketAddr, _data: &[u8]) -> ClientResult<()> {
            if !self.stalled.swap(true, Ordering::SeqCst) {
                time::sleep(Duration::from_secs(10)).await;
            }
            self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn endpoint() -> SocketAddr {
        "10.0.0.1:1812".parse().unwrap()
    }

    fn correlator(
        timeout: Duration,
        max_retries: u32,
    ) -> (ClientRequestCorrelator, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let correlator = ClientRequestCorrelator::new(
            CorrelatorConfig::new(timeout, max_retries),
            Arc::new(MemoryDictionary::standard()),
            transport.clone(),
        );
        (correlator, transport)
    }

    fn response_bytes(identifier: u8) -> Vec<u8> {
        Packet::new(Code::AccessAccept, identifier, [0u8; 16])
            .encode()
            .unwrap()
    }

    #[tokio::test]
    async fn test_submit_assigns_identifier_on_the_wire() {
        let (correlator, transport) = correlator(Duration::from_secs(5), 0);
        let request = correlator
            .submit(Packet::new(Code::AccessRequest, 0, [0u8; 16]), endpoint())
            .await
            .unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, endpoint());
        assert_eq!(sent[0].1[1], request.identifier());
        assert_eq!(correlator.pending_count(), 1);
    }

    #[tokio::test]
    async fn test_submit_with_identifier_conflict() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 0);
        let _first = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 42, [0u8; 16]), endpoint())
            .await
            .unwrap();

        let second = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 42, [1u8; 16]), endpoint())
            .await;
        assert!(matches!(
            second,
            Err(ClientError::IdentifierInUse { identifier: 42, .. })
        ));
    }

    #[tokio::test]
    async fn test_response_resolves_request() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 1);
        let request = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 3, [0u8; 16]), endpoint())
            .await
            .unwrap();

        assert!(correlator.handle_response(endpoint(), &response_bytes(3)));
        let response = request.await.unwrap();
        assert_eq!(response.code, Code::AccessAccept);
        assert_eq!(response.identifier, 3);
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_response_from_wrong_endpoint_is_unsolicited() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 1);
        let _request = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 3, [0u8; 16]), endpoint())
            .await
            .unwrap();

        let other: SocketAddr = "10.0.0.2:1812".parse().unwrap();
        assert!(!correlator.handle_response(other, &response_bytes(3)));
        assert_eq!(correlator.pending_count(), 1);
        assert_eq!(correlator.stats().unsolicited, 1);
    }

    #[tokio::test]
    async fn test_malformed_and_request_datagrams_are_dropped() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 1);
        let _request = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 3, [0u8; 16]), endpoint())
            .await
            .unwrap();

        assert!(!correlator.handle_response(endpoint(), &[2, 3, 0]));

        let request_bytes = Packet::new(Code::AccessRequest, 3, [0u8; 16])
            .encode()
            .unwrap();
        assert!(!correlator.handle_response(endpoint(), &request_bytes));

        assert_eq!(correlator.pending_count(), 1);
        assert_eq!(correlator.stats().unsolicited, 2);
    }

    #[tokio::test]
    async fn test_initial_send_failure_releases_identifier() {
        let correlator = ClientRequestCorrelator::new(
            CorrelatorConfig::new(Duration::from_secs(1), 0),
            Arc::new(MemoryDictionary::standard()),
            Arc::new(FailingTransport),
        );

        let result = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 9, [0u8; 16]), endpoint())
            .await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
        assert_eq!(correlator.pending_count(), 0);
        assert_eq!(correlator.stats().requests, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_submit_releases_identifier() {
        let transport = Arc::new(StallingTransport::default());
        let correlator = ClientRequestCorrelator::new(
            CorrelatorConfig::new(Duration::from_secs(1), 0),
            Arc::new(MemoryDictionary::standard()),
            transport.clone(),
        );

        let abandoned = time::timeout(
            Duration::from_millis(100),
            correlator.submit_with_identifier(Packet::new(Code::AccessRequest, 7, [0u8; 16]), endpoint()),
        )
        .await;
        assert!(abandoned.is_err());
        assert_eq!(correlator.pending_count(), 0);
        assert_eq!(transport.sends.load(Ordering::SeqCst), 0);

        let request = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 7, [1u8; 16]), endpoint())
            .await
            .unwrap();
        assert_eq!(request.identifier(), 7);
        assert_eq!(correlator.pending_count(), 1);
        assert_eq!(correlator.stats().requests, 1);

        assert!(correlator.handle_response(endpoint(), &response_bytes(7)));
        assert_eq!(request.await.unwrap().code, Code::AccessAccept);
        assert_eq!(correlator.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 1);
        let request = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 5, [0u8; 16]), endpoint())
            .await
            .unwrap();

        assert!(request.cancel());
        assert!(!request.cancel());
        assert!(matches!(request.await, Err(ClientError::Cancelled)));

        // A late response is now unsolicited
        assert!(!correlator.handle_response(endpoint(), &response_bytes(5)));
        assert_eq!(correlator.stats().cancellations, 1);
    }

    #[tokio::test]
    async fn test_drop_cancels() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 1);
        let request = correlator
            .submit(Packet::new(Code::AccessRequest, 0, [0u8; 16]), endpoint())
            .await
            .unwrap();
        assert_eq!(correlator.pending_count(), 1);

        drop(request);
        assert_eq!(correlator.pending_count(), 0);
        assert_eq!(correlator.stats().cancellations, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_after_retries() {
        let (correlator, transport) = correlator(Duration::from_secs(2), 2);
        let request = correlator
            .submit_with_identifier(Packet::new(Code::AccessRequest, 1, [0u8; 16]), endpoint())
            .await
            .unwrap();

        let result = request.await;
        assert!(matches!(
            result,
            Err(ClientError::Timeout {
                identifier: 1,
                retries: 2,
                ..
            })
        ));

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(_, bytes)| *bytes == sent[0].1));
        assert_eq!(correlator.stats().retransmissions, 2);
        assert_eq!(correlator.stats().timeouts, 1);
    }

    #[tokio::test]
    async fn test_shutdown() {
        let (correlator, _transport) = correlator(Duration::from_secs(5), 1);
        let first = correlator
            .submit(Packet::new(Code::AccessRequest, 0, [0u8; 16]), endpoint())
            .await
            .unwrap();
        let second = correlator
            .submit(Packet::new(Code::AccountingRequest, 0, [0u8; 16]), endpoint())
            .await
            .unwrap();

        assert_eq!(correlator.shutdown(), 2);
        assert!(correlator.is_shut_down());
        assert!(matches!(first.await, Err(ClientError::Cancelled)));
        assert!(matches!(second.await, Err(ClientError::Cancelled)));

        let result = correlator
            .submit(Packet::new(Code::AccessRequest, 0, [0u8; 16]), endpoint())
            .await;
        assert!(matches!(result, Err(ClientError::Shutdown)));
    }
}
