//! Asynchronous RADIUS client
//!
//! Sends requests built with [`radius_proto`] and matches responses to them
//! by (endpoint, identifier), retransmitting on timeout.
//!
//! # Example
//!
//! ```no_run
//! use radius_client::{ClientConfig, RadiusClient};
//! use radius_proto::{Code, MemoryDictionary, Packet, generate_request_authenticator};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), radius_client::ClientError> {
//! let config = ClientConfig::new(Duration::from_secs(3), 2);
//! let client = RadiusClient::bind(&config, Arc::new(MemoryDictionary::standard())).await?;
//!
//! let request = Packet::new(Code::StatusServer, 0, generate_request_authenticator());
//! let response = client.send(request, "127.0.0.1:1812".parse().unwrap()).await?;
//! println!("{}", response);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod correlator;
pub mod error;
pub mod pending;
pub mod stats;
pub mod transport;

pub use client::RadiusClient;
pub use config::ClientConfig;
pub use correlator::{ClientRequestCorrelator, CorrelatorConfig, DEFAULT_MAX_PENDING, PendingRequest};
pub use error::{ClientError, ClientResult};
pub use stats::{CorrelatorStats, CorrelatorStatsSnapshot};
pub use transport::{Transport, UdpTransport};
