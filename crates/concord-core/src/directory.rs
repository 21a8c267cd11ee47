//! Peer directory and Lamport clock.
//!
//! The peer table is fixed process-wide configuration: every address is
//! known at startup and the table never changes for the process lifetime.
//! It is built once by the bootstrap layer and injected into each
//! coordinator as an immutable value.

use std::sync::Arc;

use parking_lot::Mutex;

use concord_common::ConcordError;

use crate::model::ProcessId;

/// Immutable process-id → address table plus the local process identity.
#[derive(Debug)]
pub struct PeerDirectory {
    process_id: ProcessId,
    addresses: Vec<String>,
}

impl PeerDirectory {
    /// Builds the directory. `addresses[i]` is the base URL of process `i`;
    /// the local process id must index into the table.
    pub fn new(process_id: ProcessId, addresses: Vec<String>) -> Result<Self, ConcordError> {
        if addresses.is_empty() {
            return Err(ConcordError::Config("empty peer address table".to_string()));
        }
        if process_id as usize >= addresses.len() {
            return Err(ConcordError::Config(format!(
                "process id {} out of range for {} configured processes",
                process_id,
                addresses.len()
            )));
        }
        Ok(Self {
            process_id,
            addresses,
        })
    }

    pub fn process_id(&self) -> ProcessId {
        self.process_id
    }

    pub fn total_processes(&self) -> u32 {
        self.addresses.len() as u32
    }

    pub fn address_of(&self, id: ProcessId) -> Option<&str> {
        self.addresses.get(id as usize).map(String::as_str)
    }

    /// Every process id except the local one, ascending.
    pub fn peer_ids(&self) -> Vec<ProcessId> {
        (0..self.total_processes())
            .filter(|id| *id != self.process_id)
            .collect()
    }

    /// Ids strictly greater than the local one (election targets).
    pub fn higher_ids(&self) -> Vec<ProcessId> {
        (self.process_id + 1..self.total_processes()).collect()
    }

    /// Ids strictly less than the local one (coordinator announcement targets).
    pub fn lower_ids(&self) -> Vec<ProcessId> {
        (0..self.process_id).collect()
    }

    /// All process ids including the local one, ascending.
    pub fn all_ids(&self) -> Vec<ProcessId> {
        (0..self.total_processes()).collect()
    }
}

/// Lamport logical clock. Non-decreasing; ticked by one before every send,
/// advanced to `max(current, received) + 1` on receipt.
#[derive(Debug, Default)]
pub struct LamportClock {
    value: Mutex<u64>,
}

impl LamportClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock for a send event and returns the new value.
    pub fn tick(&self) -> u64 {
        let mut value = self.value.lock();
        *value += 1;
        *value
    }

    /// Advances the clock for a receive event carrying `timestamp` and
    /// returns the new value.
    pub fn witness(&self, timestamp: u64) -> u64 {
        let mut value = self.value.lock();
        *value = (*value).max(timestamp) + 1;
        *value
    }

    pub fn current(&self) -> u64 {
        *self.value.lock()
    }
}

/// Peer directory paired with the Lamport clock shared by the mutex and
/// multicast coordinators. The election coordinator takes the bare
/// [`PeerDirectory`]; it has no use for the clock.
#[derive(Debug)]
pub struct ClockedDirectory {
    peers: Arc<PeerDirectory>,
    clock: LamportClock,
}

impl ClockedDirectory {
    pub fn new(peers: Arc<PeerDirectory>) -> Self {
        Self {
            peers,
            clock: LamportClock::new(),
        }
    }

    pub fn peers(&self) -> &Arc<PeerDirectory> {
        &self.peers
    }

    pub fn process_id(&self) -> ProcessId {
        self.peers.process_id()
    }

    pub fn total_processes(&self) -> u32 {
        self.peers.total_processes()
    }

    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    pub fn witness(&self, timestamp: u64) -> u64 {
        self.clock.witness(timestamp)
    }

    pub fn clock(&self) -> u64 {
        self.clock.current()
    }
}
