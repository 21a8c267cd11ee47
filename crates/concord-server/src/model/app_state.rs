//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use concord_common::ConcordError;
use concord_core::directory::ClockedDirectory;
use concord_core::election::ElectionCoordinator;
use concord_core::multicast::TotalOrderMulticastCoordinator;
use concord_core::mutex::MutualExclusionCoordinator;
use concord_core::peer_client::HttpPeerTransport;
use concord_core::transport::PeerTransport;

use super::config::Configuration;

/// One set of coordinators plus the configuration they were built from.
/// The mutex and multicast coordinators share one clocked directory; the
/// election coordinator only sees the peer table.
pub struct AppState {
    pub configuration: Configuration,
    pub directory: Arc<ClockedDirectory>,
    pub election: ElectionCoordinator,
    pub mutex: MutualExclusionCoordinator,
    pub multicast: TotalOrderMulticastCoordinator,
}

impl AppState {
    pub fn new(configuration: Configuration) -> Result<Self, ConcordError> {
        let peers = configuration.peer_directory()?;
        let transport: Arc<dyn PeerTransport> = Arc::new(HttpPeerTransport::new(
            peers.clone(),
            configuration.peer_client_config(),
        ));
        let directory = Arc::new(ClockedDirectory::new(peers.clone()));

        Ok(Self {
            election: ElectionCoordinator::new(
                peers,
                transport.clone(),
                configuration.election_config(),
            ),
            mutex: MutualExclusionCoordinator::new(directory.clone(), transport.clone()),
            multicast: TotalOrderMulticastCoordinator::new(directory.clone(), transport),
            directory,
            configuration,
        })
    }
}
