//! Concord coordination engine.
//!
//! Each process runs three independent coordinators over a shared peer
//! directory:
//!
//! - [`election::ElectionCoordinator`]: Bully leader election
//! - [`mutex::MutualExclusionCoordinator`]: Ricart-Agrawala mutual exclusion
//! - [`multicast::TotalOrderMulticastCoordinator`]: ACK-counting reliable multicast
//!
//! The coordinators never call each other. All inter-process traffic goes
//! through the [`transport::PeerTransport`] seam; the production
//! implementation is [`peer_client::HttpPeerTransport`].

pub mod directory;
pub mod election;
pub mod model;
pub mod multicast;
pub mod mutex;
pub mod peer_client;
pub mod transport;

pub use directory::{ClockedDirectory, LamportClock, PeerDirectory};
pub use election::{ElectionConfig, ElectionCoordinator};
pub use multicast::TotalOrderMulticastCoordinator;
pub use mutex::MutualExclusionCoordinator;
pub use peer_client::{HttpPeerTransport, PeerClientConfig};
pub use transport::{PeerTransport, TransportError};
