//! Correlator statistics

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifetime counters for a correlator
#[derive(Debug, Default)]
pub struct CorrelatorStats {
    /// Requests submitted and first transmitted
    pub requests: AtomicU64,
    /// Retransmissions after a deadline expired
    pub retransmissions: AtomicU64,
    /// Responses matched to a pending request
    pub responses: AtomicU64,
    /// Responses dropped for lack of a pending request or bad framing
    pub unsolicited: AtomicU64,
    /// Requests that exhausted their retry budget
    pub timeouts: AtomicU64,
    /// Requests cancelled by the caller or by shutdown
    pub cancellations: AtomicU64,
}

impl CorrelatorStats {
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retransmission(&self) {
        self.retransmissions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_response(&self) {
        self.responses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsolicited(&self) {
        self.unsolicited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancellation(&self) {
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> CorrelatorStatsSnapshot {
        CorrelatorStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            retransmissions: self.retransmissions.load(Ordering::Relaxed),
            responses: self.responses.load(Ordering::Relaxed),
            unsolicited: self.unsolicited.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of correlator statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelatorStatsSnapshot {
    pub requests: u64,
    pub retransmissions: u64,
    pub responses: u64,
    pub unsolicited: u64,
    pub timeouts: u64,
    pub cancellations: u64,
}

impl CorrelatorStatsSnapshot {
    /// Requests not yet resolved at snapshot time
    pub fn outstanding(&self) -> u64 {
        self.requests
            .saturating_sub(self.responses + self.timeouts + self.cancellations)
    }

    /// Export statistics as JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
