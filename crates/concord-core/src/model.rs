//! Wire messages and status snapshots for the coordination protocols.
//!
//! All types serialize with camelCase field names; these shapes are the
//! inter-process protocol and the payloads returned by the status endpoints.

use serde::{Deserialize, Serialize};

/// Identifies a process and its rank. Ids are dense in `[0, N)`; a higher id
/// means higher priority in the election and as an ack-sender identity.
pub type ProcessId = u32;

// ---------------------------------------------------------------------------
// Election
// ---------------------------------------------------------------------------

/// Kind of an inter-process election message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionMessageKind {
    #[serde(rename = "ELECTION")]
    Election,
    #[serde(rename = "COORDINATOR")]
    Coordinator,
}

/// Election wire message. `ELECTION` is sent to higher-id peers when a round
/// starts; `COORDINATOR` announces the winner to lower-id peers.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionMessage {
    pub process_id: ProcessId,
    #[serde(rename = "type")]
    pub kind: ElectionMessageKind,
}

/// Handler result for an election message. The transport-level success of
/// the call is the implicit "OK"; `should_reply_ok` additionally reports
/// whether the receiver outranked the sender.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionReply {
    pub should_reply_ok: bool,
}

/// Read-only election snapshot.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionStatus {
    pub process_id: ProcessId,
    pub coordinator_id: Option<ProcessId>,
    pub is_coordinator: bool,
    pub in_election: bool,
}

// ---------------------------------------------------------------------------
// Mutual exclusion
// ---------------------------------------------------------------------------

/// A critical-section request, totally ordered by `(timestamp, processId)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutexRequest {
    pub process_id: ProcessId,
    pub timestamp: u64,
}

impl MutexRequest {
    /// Strict precedence under the `(timestamp, processId)` order. Equal
    /// timestamps break the tie by ascending process id.
    pub fn precedes(&self, other: &MutexRequest) -> bool {
        (self.timestamp, self.process_id) < (other.timestamp, other.process_id)
    }

    /// Sort key for the request queue.
    pub fn order_key(&self) -> (u64, ProcessId) {
        (self.timestamp, self.process_id)
    }
}

/// Body of a mutex REPLY call. Carries the replier's id for logging only;
/// the receiving side counts replies, it does not inspect the sender.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutexReply {
    pub process_id: ProcessId,
}

/// Read-only mutual-exclusion snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutexStatus {
    pub process_id: ProcessId,
    pub in_critical_section: bool,
    pub queue_length: usize,
    pub waiting_for_replies: u32,
    pub deferred_replies: Vec<ProcessId>,
    pub logical_clock: u64,
}

// ---------------------------------------------------------------------------
// Total-order multicast
// ---------------------------------------------------------------------------

/// A multicast payload. Immutable once created; `id` is unique per origin
/// and send event (`msg-<sender>-<millis>`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastMessage {
    pub id: String,
    pub sender_id: ProcessId,
    pub timestamp: u64,
    pub content: String,
}

/// Acknowledgement for a multicast message, sent to every process.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckMessage {
    pub message_id: String,
    pub process_id: ProcessId,
    pub timestamp: u64,
}

/// Configured artificial delay for the next outgoing ACK of one message id.
/// Used to exercise reordering scenarios.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayedAck {
    pub message_id: String,
    pub delay_ms: u64,
}

/// One entry of the multicast queue snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: String,
    pub message: MulticastMessage,
    pub acks_received: usize,
    pub acks_needed: usize,
    pub delivered: bool,
}

/// Read-only multicast snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MulticastStatus {
    pub process_id: ProcessId,
    pub logical_clock: u64,
    pub queue_size: usize,
    pub total_processes: u32,
    pub delayed_ack: Option<DelayedAck>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutex_request_ordering() {
        let a = MutexRequest {
            process_id: 0,
            timestamp: 1,
        };
        let b = MutexRequest {
            process_id: 1,
            timestamp: 1,
        };
        let c = MutexRequest {
            process_id: 0,
            timestamp: 2,
        };

        // Equal timestamps break the tie by ascending process id
        assert!(a.precedes(&b));
        assert!(!b.precedes(&a));

        // Smaller timestamp always wins
        assert!(b.precedes(&c));
        assert!(!c.precedes(&b));

        // Irreflexive
        assert!(!a.precedes(&a));
    }

    #[test]
    fn test_election_message_wire_format() {
        let msg = ElectionMessage {
            process_id: 2,
            kind: ElectionMessageKind::Election,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["processId"], 2);
        assert_eq!(json["type"], "ELECTION");

        let back: ElectionMessage =
            serde_json::from_str(r#"{"processId":1,"type":"COORDINATOR"}"#).unwrap();
        assert_eq!(back.process_id, 1);
        assert_eq!(back.kind, ElectionMessageKind::Coordinator);
    }

    #[test]
    fn test_multicast_message_wire_format() {
        let json = r#"{"id":"msg-0-17","senderId":0,"timestamp":5,"content":"hello"}"#;
        let msg: MulticastMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.sender_id, 0);
        assert_eq!(msg.timestamp, 5);

        let ack = AckMessage {
            message_id: msg.id.clone(),
            process_id: 1,
            timestamp: 6,
        };
        let value = serde_json::to_value(&ack).unwrap();
        assert_eq!(value["messageId"], "msg-0-17");
        assert_eq!(value["processId"], 1);
    }
}
