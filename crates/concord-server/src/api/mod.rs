//! HTTP endpoints, one module per coordinator plus health/index.

pub mod election;
pub mod health;
pub mod multicast;
pub mod mutex;
