//! Client error types

use std::net::SocketAddr;
use thiserror::Error;

/// RADIUS client errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error during network operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RADIUS packet encoding/decoding error
    #[error("Packet error: {0}")]
    Packet(#[from] radius_proto::PacketError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration file could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Retry budget exhausted without a matching response
    #[error("Request {identifier} to {endpoint} timed out after {retries} retransmissions")]
    Timeout {
        endpoint: SocketAddr,
        identifier: u8,
        retries: u32,
    },

    /// Request was cancelled by the caller or by shutdown
    #[error("Request cancelled")]
    Cancelled,

    /// Another request to the same endpoint already holds this identifier
    #[error("Identifier {identifier} already pending for {endpoint}")]
    IdentifierInUse { endpoint: SocketAddr, identifier: u8 },

    /// All 256 identifiers are pending for the endpoint
    #[error("No free identifier for {0}: 256 requests in flight")]
    IdentifiersExhausted(SocketAddr),

    /// Pending table is at capacity
    #[error("Too many pending requests: {0}")]
    TooManyPending(usize),

    /// Correlator has been shut down
    #[error("Client is shut down")]
    Shutdown,

    /// Transport could not deliver a datagram
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
