//! Shared building blocks for the Concord workspace.

pub mod error;

pub use error::{ConcordError, Result};
