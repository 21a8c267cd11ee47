//! Ricart–Agrawala mutual exclusion.
//!
//! A process enters the critical section only after every other process has
//! replied to its timestamped request; each receiver defers its reply while
//! it is inside the critical section or holds an older pending request of
//! its own. Ties on equal timestamps break by ascending process id.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use concord_common::ConcordError;

use crate::directory::ClockedDirectory;
use crate::model::{MutexReply, MutexRequest, MutexStatus, ProcessId};
use crate::transport::PeerTransport;

#[derive(Debug, Default)]
struct MutexState {
    /// Own and peer requests, kept sorted by `(timestamp, processId)`.
    request_queue: Vec<MutexRequest>,
    in_critical_section: bool,
    /// Replies still outstanding for the own pending request.
    pending_replies: u32,
    /// Peers whose reply is withheld until the critical section is released.
    deferred_replies: BTreeSet<ProcessId>,
}

impl MutexState {
    fn insert_sorted(&mut self, request: MutexRequest) {
        self.request_queue.push(request);
        self.request_queue.sort_by_key(MutexRequest::order_key);
    }

    fn own_request(&self, process_id: ProcessId) -> Option<&MutexRequest> {
        self.request_queue
            .iter()
            .find(|r| r.process_id == process_id)
    }

    fn has_own_request(&self, process_id: ProcessId) -> bool {
        self.own_request(process_id).is_some()
    }
}

/// Per-process Ricart–Agrawala state machine.
#[derive(Clone)]
pub struct MutualExclusionCoordinator {
    directory: Arc<ClockedDirectory>,
    transport: Arc<dyn PeerTransport>,
    state: Arc<Mutex<MutexState>>,
}

impl MutualExclusionCoordinator {
    pub fn new(directory: Arc<ClockedDirectory>, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            directory,
            transport,
            state: Arc::new(Mutex::new(MutexState::default())),
        }
    }

    /// Requests the critical section: queues an own timestamped request and
    /// asks every peer for permission. Entry happens later, through
    /// [`receive_reply`](Self::receive_reply), once all peers have answered.
    pub async fn request_access(&self) -> Result<(), ConcordError> {
        let process_id = self.directory.process_id();

        let request = {
            let mut state = self.state.lock();
            if state.in_critical_section {
                return Err(ConcordError::IllegalState(
                    "already in critical section".to_string(),
                ));
            }
            if state.has_own_request(process_id) {
                return Err(ConcordError::IllegalState(
                    "access request already pending".to_string(),
                ));
            }

            let request = MutexRequest {
                process_id,
                timestamp: self.directory.tick(),
            };
            state.insert_sorted(request);
            state.pending_replies = self.directory.total_processes() - 1;
            request
        };

        info!(process_id, timestamp = request.timestamp, "requesting critical section");

        let calls = self.directory.peers().peer_ids().into_iter().map(|target| {
            let transport = self.transport.clone();
            async move {
                if let Err(e) = transport.send_mutex_request(target, &request).await {
                    warn!(process_id, peer = target, error = %e, "failed to send mutex request");
                }
            }
        });
        futures::future::join_all(calls).await;
        Ok(())
    }

    /// Handles a peer's request: queue it, then either grant immediately or
    /// defer the reply until our own release.
    pub async fn receive_request(&self, request: MutexRequest) {
        let process_id = self.directory.process_id();
        self.directory.witness(request.timestamp);

        let reply_now = {
            let mut state = self.state.lock();
            state.insert_sorted(request);

            let reply_now = !state.in_critical_section
                && match state.own_request(process_id) {
                    None => true,
                    Some(own) => request.precedes(own),
                };
            if !reply_now {
                debug!(process_id, to = request.process_id, "deferring reply");
                state.deferred_replies.insert(request.process_id);
            }
            reply_now
        };

        if reply_now {
            self.send_reply(request.process_id).await;
        }
    }

    /// Handles one permission grant. When the last outstanding reply lands
    /// and the own request heads the queue, the process enters the critical
    /// section.
    pub fn receive_reply(&self) {
        let process_id = self.directory.process_id();
        let mut state = self.state.lock();

        if state.pending_replies == 0 {
            warn!(process_id, "reply received with no outstanding request");
            return;
        }
        state.pending_replies -= 1;
        debug!(process_id, remaining = state.pending_replies, "reply received");

        if state.pending_replies > 0 {
            return;
        }

        // Full quorum. Any peer entry still ordered before our own request
        // is stale: that peer replied on release and already removed the
        // entry from its own queue. Drop it here before the head check.
        if let Some(own) = state.own_request(process_id).copied() {
            state
                .request_queue
                .retain(|r| r.process_id == process_id || !r.precedes(&own));
        }

        if state
            .request_queue
            .first()
            .is_some_and(|r| r.process_id == process_id)
        {
            state.in_critical_section = true;
            info!(process_id, "entered critical section");
        }
    }

    /// Leaves the critical section and flushes every deferred reply.
    pub async fn release_access(&self) -> Result<(), ConcordError> {
        let process_id = self.directory.process_id();

        let deferred: Vec<ProcessId> = {
            let mut state = self.state.lock();
            if !state.in_critical_section {
                return Err(ConcordError::IllegalState(
                    "not in critical section".to_string(),
                ));
            }
            state.in_critical_section = false;
            state.request_queue.retain(|r| r.process_id != process_id);
            std::mem::take(&mut state.deferred_replies).into_iter().collect()
        };

        info!(process_id, deferred = deferred.len(), "left critical section");

        let replies = deferred.into_iter().map(|target| async move {
            self.send_reply(target).await;
        });
        futures::future::join_all(replies).await;
        Ok(())
    }

    /// Read-only snapshot.
    pub fn status(&self) -> MutexStatus {
        let state = self.state.lock();
        MutexStatus {
            process_id: self.directory.process_id(),
            in_critical_section: state.in_critical_section,
            queue_length: state.request_queue.len(),
            waiting_for_replies: state.pending_replies,
            deferred_replies: state.deferred_replies.iter().copied().collect(),
            logical_clock: self.directory.clock(),
        }
    }

    async fn send_reply(&self, target: ProcessId) {
        let process_id = self.directory.process_id();
        debug!(process_id, to = target, "sending reply");
        let reply = MutexReply { process_id };
        if let Err(e) = self.transport.send_mutex_reply(target, &reply).await {
            warn!(process_id, peer = target, error = %e, "failed to send mutex reply");
        }
    }
}
