//! Process startup: logging initialization and HTTP server construction.

pub mod http;
pub mod logging;

pub use http::main_server;
pub use logging::{LoggingConfig, LoggingGuard, init_logging};
