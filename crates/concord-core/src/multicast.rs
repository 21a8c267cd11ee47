//! Totally-ordered reliable multicast (ISIS-style ACK counting).
//!
//! Every message is held in a pending queue until an ACK from all N
//! processes has been recorded, then delivered to the local application
//! exactly once. Receivers acknowledge to everyone, the sender included,
//! and the sender seeds its own entry with itself as first acker.
//!
//! Deliverability is re-evaluated over the whole queue in `(timestamp,
//! senderId)` order whenever an ACK arrives; each entry delivers
//! independently of earlier-ordered ones still awaiting quorum. Delivered
//! entries are retained, not compacted.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::directory::ClockedDirectory;
use crate::model::{AckMessage, DelayedAck, MulticastMessage, MulticastStatus, ProcessId, QueueEntry};
use crate::transport::PeerTransport;

#[derive(Debug)]
struct PendingDelivery {
    message: MulticastMessage,
    acks: BTreeSet<ProcessId>,
    delivered: bool,
}

#[derive(Debug, Default)]
struct MulticastState {
    /// Message id → pending entry. Entries are created on first receipt and
    /// never removed.
    queue: HashMap<String, PendingDelivery>,
    delayed_ack: Option<DelayedAck>,
}

/// Per-process multicast state machine.
#[derive(Clone)]
pub struct TotalOrderMulticastCoordinator {
    directory: Arc<ClockedDirectory>,
    transport: Arc<dyn PeerTransport>,
    state: Arc<Mutex<MulticastState>>,
}

impl TotalOrderMulticastCoordinator {
    pub fn new(directory: Arc<ClockedDirectory>, transport: Arc<dyn PeerTransport>) -> Self {
        Self {
            directory,
            transport,
            state: Arc::new(Mutex::new(MulticastState::default())),
        }
    }

    /// Multicasts `content` to every process. Returns the constructed
    /// message immediately; local delivery happens once the ACK quorum is
    /// complete, not at send time.
    pub async fn send_message(&self, content: String) -> MulticastMessage {
        let sender_id = self.directory.process_id();
        let timestamp = self.directory.tick();
        // The clock ticks once per send, so (sender, timestamp) is unique
        // per send event.
        let message = MulticastMessage {
            id: format!("msg-{}-{}", sender_id, timestamp),
            sender_id,
            timestamp,
            content,
        };

        info!(process_id = sender_id, id = %message.id, timestamp, "multicasting message");

        // The sender counts as its own first ack source.
        self.state
            .lock()
            .queue
            .entry(message.id.clone())
            .or_insert_with(|| PendingDelivery {
                message: message.clone(),
                acks: BTreeSet::from([sender_id]),
                delivered: false,
            });

        let sends = self.directory.peers().peer_ids().into_iter().map(|target| {
            let transport = self.transport.clone();
            let message = message.clone();
            async move {
                if let Err(e) = transport.send_multicast_message(target, &message).await {
                    warn!(process_id = sender_id, peer = target, error = %e, "failed to send message");
                }
            }
        });
        futures::future::join_all(sends).await;

        message
    }

    /// Handles a message from a peer: queue it (seeded with the sender's
    /// ack) and acknowledge to all N processes, self included. The ACK
    /// fan-out runs asynchronously and honors a configured artificial delay
    /// once per matching message id.
    pub fn receive_message(&self, message: MulticastMessage) {
        let process_id = self.directory.process_id();
        self.directory.witness(message.timestamp);
        info!(process_id, id = %message.id, from = message.sender_id, "received message");

        let delay = {
            let mut state = self.state.lock();
            state
                .queue
                .entry(message.id.clone())
                .or_insert_with(|| PendingDelivery {
                    message: message.clone(),
                    acks: BTreeSet::from([message.sender_id]),
                    delivered: false,
                });

            // Consume the delay configuration on first use.
            state
                .delayed_ack
                .take_if(|d| d.message_id == message.id)
                .map(|d| Duration::from_millis(d.delay_ms))
        };

        let ack = AckMessage {
            message_id: message.id,
            process_id,
            timestamp: self.directory.tick(),
        };
        let transport = self.transport.clone();
        let targets = self.directory.peers().all_ids();
        tokio::spawn(async move {
            if let Some(delay) = delay {
                info!(process_id, id = %ack.message_id, delay_ms = delay.as_millis() as u64, "delaying ack");
                tokio::time::sleep(delay).await;
            }
            let sends = targets.into_iter().map(|target| {
                let transport = transport.clone();
                let ack = ack.clone();
                async move {
                    if let Err(e) = transport.send_multicast_ack(target, &ack).await {
                        warn!(process_id, peer = target, error = %e, "failed to send ack");
                    }
                }
            });
            futures::future::join_all(sends).await;
        });
    }

    /// Records an ACK and re-evaluates deliverability of every pending,
    /// undelivered entry.
    pub fn receive_ack(&self, ack: AckMessage) {
        let process_id = self.directory.process_id();
        self.directory.witness(ack.timestamp);

        let delivered_now = {
            let mut state = self.state.lock();
            match state.queue.get_mut(&ack.message_id) {
                Some(pending) => {
                    pending.acks.insert(ack.process_id);
                    debug!(
                        process_id,
                        id = %ack.message_id,
                        from = ack.process_id,
                        acks = pending.acks.len(),
                        needed = self.directory.total_processes(),
                        "ack recorded"
                    );
                }
                None => {
                    debug!(process_id, id = %ack.message_id, "ack for unknown message dropped");
                }
            }
            self.collect_deliverable(&mut state)
        };

        for message in delivered_now {
            self.deliver(&message);
        }
    }

    /// Configures the next outgoing ACK for `message_id` to be delayed.
    pub fn set_delayed_ack(&self, message_id: String, delay_ms: u64) {
        info!(
            process_id = self.directory.process_id(),
            id = %message_id,
            delay_ms,
            "configured delayed ack"
        );
        self.state.lock().delayed_ack = Some(DelayedAck {
            message_id,
            delay_ms,
        });
    }

    /// Queue snapshot in `(timestamp, senderId)` order.
    pub fn queue(&self) -> Vec<QueueEntry> {
        let state = self.state.lock();
        let needed = self.directory.total_processes() as usize;
        let mut entries: Vec<QueueEntry> = state
            .queue
            .values()
            .map(|pending| QueueEntry {
                id: pending.message.id.clone(),
                message: pending.message.clone(),
                acks_received: pending.acks.len(),
                acks_needed: needed,
                delivered: pending.delivered,
            })
            .collect();
        entries.sort_by_key(|e| (e.message.timestamp, e.message.sender_id));
        entries
    }

    /// Read-only snapshot.
    pub fn status(&self) -> MulticastStatus {
        let state = self.state.lock();
        MulticastStatus {
            process_id: self.directory.process_id(),
            logical_clock: self.directory.clock(),
            queue_size: state.queue.len(),
            total_processes: self.directory.total_processes(),
            delayed_ack: state.delayed_ack.clone(),
        }
    }

    /// Marks every full-quorum entry delivered, walking the queue in
    /// `(timestamp, senderId)` order. An entry delivers as soon as its own
    /// quorum completes, independent of earlier-ordered entries still
    /// waiting. Out-of-order delivery under partial ACK arrival is part of
    /// the observed protocol.
    fn collect_deliverable(&self, state: &mut MulticastState) -> Vec<MulticastMessage> {
        let needed = self.directory.total_processes() as usize;

        let mut order: Vec<(u64, ProcessId, String)> = state
            .queue
            .iter()
            .filter(|(_, p)| !p.delivered)
            .map(|(id, p)| (p.message.timestamp, p.message.sender_id, id.clone()))
            .collect();
        order.sort();

        let mut delivered = Vec::new();
        for (_, _, id) in order {
            if let Some(pending) = state.queue.get_mut(&id)
                && pending.acks.len() == needed
            {
                pending.delivered = true;
                delivered.push(pending.message.clone());
            }
        }
        delivered
    }

    /// The observable local delivery event. Fires exactly once per message.
    fn deliver(&self, message: &MulticastMessage) {
        info!(
            process_id = self.directory.process_id(),
            id = %message.id,
            from = message.sender_id,
            timestamp = message.timestamp,
            content = %message.content,
            clock = self.directory.clock(),
            "delivering message"
        );
    }
}
