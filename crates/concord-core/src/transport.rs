//! Inter-process call seam.
//!
//! The coordinators fan calls out through this trait so the engine can be
//! exercised against an in-memory wiring in tests while production uses the
//! HTTP client in [`crate::peer_client`]. A failed call means "that peer is
//! down or non-responsive": callers log it and fold it into the protocol's
//! no-response case, they never retry or abort sibling calls.

use async_trait::async_trait;

use crate::model::{AckMessage, ElectionMessage, ElectionReply, MulticastMessage, MutexReply, MutexRequest, ProcessId};

/// Transport-level failure talking to one peer.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("peer {0} unreachable: {1}")]
    Unreachable(ProcessId, String),

    #[error("peer {0} returned an error response: {1}")]
    Rejected(ProcessId, String),

    #[error("no address configured for process {0}")]
    UnknownPeer(ProcessId),
}

/// One method per point-to-point protocol call.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Delivers an `ELECTION` or `COORDINATOR` message. A successful return
    /// is the Bully protocol's implicit "OK" from the target.
    async fn send_election_message(
        &self,
        target: ProcessId,
        message: &ElectionMessage,
    ) -> Result<ElectionReply, TransportError>;

    async fn send_mutex_request(
        &self,
        target: ProcessId,
        request: &MutexRequest,
    ) -> Result<(), TransportError>;

    async fn send_mutex_reply(
        &self,
        target: ProcessId,
        reply: &MutexReply,
    ) -> Result<(), TransportError>;

    async fn send_multicast_message(
        &self,
        target: ProcessId,
        message: &MulticastMessage,
    ) -> Result<(), TransportError>;

    async fn send_multicast_ack(
        &self,
        target: ProcessId,
        ack: &AckMessage,
    ) -> Result<(), TransportError>;
}
