//! HTTP implementation of [`PeerTransport`].
//!
//! Each protocol call is a JSON POST against the matching endpoint of the
//! target process. Responses use the server's `{code, message, data}`
//! envelope; for everything except the election reply only the HTTP status
//! matters. No request timeout is applied here: the election coordinator
//! bounds its own calls, and mutex/multicast calls are unbounded by design.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::directory::PeerDirectory;
use crate::model::{AckMessage, ElectionMessage, ElectionReply, MulticastMessage, MutexReply, MutexRequest, ProcessId};
use crate::transport::{PeerTransport, TransportError};

/// Configuration for the HTTP peer client.
#[derive(Clone, Debug)]
pub struct PeerClientConfig {
    /// TCP connect timeout per call.
    pub connect_timeout: Duration,
}

impl Default for PeerClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Envelope the peer's HTTP layer wraps every payload in.
#[derive(Debug, serde::Deserialize)]
struct ApiEnvelope<T> {
    #[allow(dead_code)]
    code: i32,
    #[allow(dead_code)]
    message: String,
    data: T,
}

/// reqwest-backed peer transport.
pub struct HttpPeerTransport {
    peers: Arc<PeerDirectory>,
    client: reqwest::Client,
}

impl HttpPeerTransport {
    pub fn new(peers: Arc<PeerDirectory>, config: PeerClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .expect("failed to build HTTP client");
        Self { peers, client }
    }

    fn url_for(&self, target: ProcessId, path: &str) -> Result<String, TransportError> {
        let base = self
            .peers
            .address_of(target)
            .ok_or(TransportError::UnknownPeer(target))?;
        Ok(format!("{}{}", base.trim_end_matches('/'), path))
    }

    /// POSTs `body` to `path` on `target` and returns the envelope's data.
    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        target: ProcessId,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let url = self.url_for(target, path)?;
        debug!(peer = target, url = %url, "peer call");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(target, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected(
                target,
                format!("{}: {}", status, text),
            ));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Rejected(target, e.to_string()))?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl PeerTransport for HttpPeerTransport {
    async fn send_election_message(
        &self,
        target: ProcessId,
        message: &ElectionMessage,
    ) -> Result<ElectionReply, TransportError> {
        self.post(target, "/election/message", message).await
    }

    async fn send_mutex_request(
        &self,
        target: ProcessId,
        request: &MutexRequest,
    ) -> Result<(), TransportError> {
        self.post::<_, serde_json::Value>(target, "/mutex/request", request)
            .await
            .map(|_| ())
    }

    async fn send_mutex_reply(
        &self,
        target: ProcessId,
        reply: &MutexReply,
    ) -> Result<(), TransportError> {
        self.post::<_, serde_json::Value>(target, "/mutex/reply", reply)
            .await
            .map(|_| ())
    }

    async fn send_multicast_message(
        &self,
        target: ProcessId,
        message: &MulticastMessage,
    ) -> Result<(), TransportError> {
        self.post::<_, serde_json::Value>(target, "/multicast/receive", message)
            .await
            .map(|_| ())
    }

    async fn send_multicast_ack(
        &self,
        target: ProcessId,
        ack: &AckMessage,
    ) -> Result<(), TransportError> {
        self.post::<_, serde_json::Value>(target, "/multicast/ack", ack)
            .await
            .map(|_| ())
    }
}
