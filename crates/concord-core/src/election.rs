//! Bully leader election.
//!
//! The highest-surviving process id always wins. A round sends `ELECTION`
//! to every higher id with a bounded per-call timeout; silence from all of
//! them means the local process takes over and announces `COORDINATOR` to
//! every lower id. There is no explicit NACK anywhere; a peer that
//! outranks the sender simply answers the call and starts contending
//! itself.
//!
//! Elections run only on explicit trigger; nothing here watches the
//! current coordinator for liveness.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::directory::PeerDirectory;
use crate::model::{ElectionMessage, ElectionMessageKind, ElectionReply, ElectionStatus, ProcessId};
use crate::transport::PeerTransport;

/// Election tuning knobs.
#[derive(Clone, Debug)]
pub struct ElectionConfig {
    /// How long to wait for each higher-id peer before counting it as down.
    pub call_timeout: Duration,
    /// Pause before a bullied process starts its own round.
    pub contest_delay: Duration,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(2),
            contest_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ElectionPhase {
    Idle,
    Electing,
    Coordinator,
    Follower,
}

#[derive(Debug)]
struct ElectionState {
    phase: ElectionPhase,
    coordinator_id: Option<ProcessId>,
}

/// Per-process election state machine.
#[derive(Clone)]
pub struct ElectionCoordinator {
    peers: Arc<PeerDirectory>,
    transport: Arc<dyn PeerTransport>,
    config: ElectionConfig,
    state: Arc<Mutex<ElectionState>>,
}

impl ElectionCoordinator {
    pub fn new(
        peers: Arc<PeerDirectory>,
        transport: Arc<dyn PeerTransport>,
        config: ElectionConfig,
    ) -> Self {
        Self {
            peers,
            transport,
            config,
            state: Arc::new(Mutex::new(ElectionState {
                phase: ElectionPhase::Idle,
                coordinator_id: None,
            })),
        }
    }

    /// Starts an election round. A no-op while a round is already running,
    /// so concurrent triggers cannot double the peer traffic.
    pub async fn start_election(&self) {
        {
            let mut state = self.state.lock();
            if state.phase == ElectionPhase::Electing {
                info!(process_id = self.peers.process_id(), "already electing");
                return;
            }
            state.phase = ElectionPhase::Electing;
        }

        let process_id = self.peers.process_id();
        let higher = self.peers.higher_ids();
        info!(process_id, candidates = higher.len(), "starting election");

        // Base case: nobody outranks us, take over immediately.
        if higher.is_empty() {
            self.become_coordinator().await;
            return;
        }

        let message = ElectionMessage {
            process_id,
            kind: ElectionMessageKind::Election,
        };

        // Fan out to every higher id and wait for all calls to settle; a
        // single success already decides the branch but must not cancel the
        // remaining calls.
        let calls = higher.iter().map(|&target| {
            let transport = self.transport.clone();
            let timeout = self.config.call_timeout;
            async move {
                match tokio::time::timeout(timeout, transport.send_election_message(target, &message))
                    .await
                {
                    Ok(Ok(_)) => {
                        info!(process_id, from = target, "received OK");
                        true
                    }
                    Ok(Err(e)) => {
                        info!(process_id, peer = target, error = %e, "no response");
                        false
                    }
                    Err(_) => {
                        info!(process_id, peer = target, "no response within timeout");
                        false
                    }
                }
            }
        });
        let answered = futures::future::join_all(calls).await;

        if answered.iter().any(|ok| *ok) {
            // Someone higher is alive; they will finish the election and
            // announce themselves.
            let mut state = self.state.lock();
            if state.phase == ElectionPhase::Electing {
                state.phase = ElectionPhase::Follower;
            }
            info!(process_id, "higher process alive, awaiting coordinator announcement");
        } else {
            self.become_coordinator().await;
        }
    }

    /// Handles an inbound election message. Returning from an `ELECTION`
    /// call at all is the implicit OK; `should_reply_ok` records whether
    /// this process outranked the sender.
    pub fn receive_message(&self, message: ElectionMessage) -> ElectionReply {
        let process_id = self.peers.process_id();
        match message.kind {
            ElectionMessageKind::Election => {
                if process_id > message.process_id {
                    info!(process_id, from = message.process_id, "bullying lower-id candidate");
                    // Contend asynchronously: this process may outrank
                    // everyone still alive.
                    let coordinator = self.clone();
                    let delay = self.config.contest_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        coordinator.start_election().await;
                    });
                    ElectionReply {
                        should_reply_ok: true,
                    }
                } else {
                    // The higher-id sender hears nothing from us; silence is
                    // the signal in the Bully protocol.
                    ElectionReply {
                        should_reply_ok: false,
                    }
                }
            }
            ElectionMessageKind::Coordinator => {
                {
                    let mut state = self.state.lock();
                    state.coordinator_id = Some(message.process_id);
                    state.phase = ElectionPhase::Follower;
                }
                info!(process_id, coordinator = message.process_id, "new coordinator announced");
                ElectionReply {
                    should_reply_ok: false,
                }
            }
        }
    }

    /// Read-only snapshot.
    pub fn status(&self) -> ElectionStatus {
        let state = self.state.lock();
        ElectionStatus {
            process_id: self.peers.process_id(),
            coordinator_id: state.coordinator_id,
            is_coordinator: state.coordinator_id == Some(self.peers.process_id()),
            in_election: state.phase == ElectionPhase::Electing,
        }
    }

    /// Commits the local process as coordinator, then announces to every
    /// lower id. Announcement failures are logged only; the transition has
    /// already happened.
    async fn become_coordinator(&self) {
        let process_id = self.peers.process_id();
        {
            let mut state = self.state.lock();
            state.coordinator_id = Some(process_id);
            state.phase = ElectionPhase::Coordinator;
        }
        info!(process_id, "becoming coordinator");

        let message = ElectionMessage {
            process_id,
            kind: ElectionMessageKind::Coordinator,
        };
        let announcements = self.peers.lower_ids().into_iter().map(|target| {
            let transport = self.transport.clone();
            async move {
                if let Err(e) = transport.send_election_message(target, &message).await {
                    warn!(process_id, peer = target, error = %e, "failed to announce coordinator");
                }
            }
        });
        futures::future::join_all(announcements).await;
    }
}
