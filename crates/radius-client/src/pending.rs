//! Pending-request table
//!
//! Tracks in-flight requests keyed by (endpoint, identifier). Every entry
//! owns the one-shot sender for its request; whoever removes the entry is
//! the only party able to resolve it.

use crate::error::{ClientError, ClientResult};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use radius_proto::Packet;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Correlation key: destination endpoint and packet identifier
pub type PendingKey = (SocketAddr, u8);

/// Outcome delivered to the request handle
pub type PendingOutcome = ClientResult<Packet>;

/// One in-flight request
pub struct PendingEntry {
    /// Encoded request, retransmitted unchanged
    pub request: Arc<[u8]>,
    /// Instant at which the current attempt expires
    pub deadline: Instant,
    /// Retransmissions performed so far
    pub retries: u32,
    /// Distinguishes this request from later ones reusing the key
    pub serial: u64,
    sender: oneshot::Sender<PendingOutcome>,
}

impl PendingEntry {
    pub fn new(
        request: Arc<[u8]>,
        deadline: Instant,
        serial: u64,
        sender: oneshot::Sender<PendingOutcome>,
    ) -> Self {
        PendingEntry {
            request,
            deadline,
            retries: 0,
            serial,
            sender,
        }
    }

    /// Deliver the terminal outcome
    ///
    /// Returns false when the handle has already been dropped.
    pub fn resolve(self, outcome: PendingOutcome) -> bool {
        self.sender.send(outcome).is_ok()
    }
}

/// Concurrent table of pending requests
///
/// The capacity is a hard limit: a slot is reserved atomically before the
/// entry is placed and released whenever an entry leaves the table.
pub struct PendingTable {
    entries: DashMap<PendingKey, PendingEntry>,
    /// Next identifier to try, per endpoint
    cursors: DashMap<SocketAddr, u8>,
    /// Slots held by entries, including inserts still in progress
    reserved: AtomicUsize,
    max_entries: usize,
}

impl PendingTable {
    pub fn new(max_entries: usize) -> Self {
        PendingTable {
            entries: DashMap::new(),
            cursors: DashMap::new(),
            reserved: AtomicUsize::new(0),
            max_entries,
        }
    }

    fn reserve(&self) -> ClientResult<()> {
        self.reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |held| {
                (held < self.max_entries).then_some(held + 1)
            })
            .map(|_| ())
            .map_err(ClientError::TooManyPending)
    }

    fn release(&self) {
        self.reserved.fetch_sub(1, Ordering::AcqRel);
    }

    fn released(&self, entry: Option<PendingEntry>) -> Option<PendingEntry> {
        if entry.is_some() {
            self.release();
        }
        entry
    }

    /// Insert under a caller-chosen identifier
    ///
    /// Fails if another request to the endpoint already holds it.
    pub fn insert(
        &self,
        endpoint: SocketAddr,
        identifier: u8,
        build: impl FnOnce(u8) -> PendingEntry,
    ) -> ClientResult<Arc<[u8]>> {
        self.reserve()?;

        match self.entries.entry((endpoint, identifier)) {
            Entry::Occupied(_) => {
                self.release();
                Err(ClientError::IdentifierInUse {
                    endpoint,
                    identifier,
                })
            }
            Entry::Vacant(slot) => Ok(slot.insert(build(identifier)).request.clone()),
        }
    }

    /// Insert under the next free identifier for the endpoint
    ///
    /// Identifiers are handed out round-robin starting from a random
    /// point, skipping those still pending.
    pub fn insert_next(
        &self,
        endpoint: SocketAddr,
        build: impl FnOnce(u8) -> PendingEntry,
    ) -> ClientResult<(u8, Arc<[u8]>)> {
        self.reserve()?;

        let start = *self
            .cursors
            .entry(endpoint)
            .or_insert_with(rand::random::<u8>);

        for offset in 0..=u8::MAX {
            let identifier = start.wrapping_add(offset);
            if let Entry::Vacant(slot) = self.entries.entry((endpoint, identifier)) {
                let request = slot.insert(build(identifier)).request.clone();
                self.cursors.insert(endpoint, identifier.wrapping_add(1));
                return Ok((identifier, request));
            }
        }

        self.release();
        Err(ClientError::IdentifiersExhausted(endpoint))
    }

    /// Remove the entry for a key regardless of which request holds it
    pub fn remove(&self, key: &PendingKey) -> Option<PendingEntry> {
        self.released(self.entries.remove(key).map(|(_, entry)| entry))
    }

    /// Remove the entry only if it still belongs to request `serial`
    pub fn remove_if_serial(&self, key: &PendingKey, serial: u64) -> Option<PendingEntry> {
        self.released(
            self.entries
                .remove_if(key, |_, entry| entry.serial == serial)
                .map(|(_, entry)| entry),
        )
    }

    /// Apply `f` to the entry if it still belongs to request `serial`
    pub fn update<R>(
        &self,
        key: &PendingKey,
        serial: u64,
        f: impl FnOnce(&mut PendingEntry) -> R,
    ) -> Option<R> {
        let mut entry = self.entries.get_mut(key)?;
        if entry.serial != serial {
            return None;
        }
        Some(f(entry.value_mut()))
    }

    /// Deadline of the current attempt for request `serial`
    pub fn deadline(&self, key: &PendingKey, serial: u64) -> Option<Instant> {
        self.entries
            .get(key)
            .filter(|entry| entry.serial == serial)
            .map(|entry| entry.deadline)
    }

    pub fn contains(&self, key: &PendingKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove and return every entry
    pub fn drain(&self) -> Vec<(PendingKey, PendingEntry)> {
        let keys: Vec<PendingKey> = self.entries.iter().map(|entry| *entry.key()).collect();
        keys.into_iter()
            .filter_map(|key| self.entries.remove(&key))
            .inspect(|_| self.release())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
