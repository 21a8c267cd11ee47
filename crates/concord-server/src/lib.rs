//! HTTP listener and bootstrap for a Concord process.
//!
//! Everything algorithmic lives in `concord-core`; this crate only exposes
//! the coordinators over HTTP, resolves the peer directory from
//! configuration, and wires up logging.

pub mod api;
pub mod model;
pub mod startup;
