//! Configuration management for the Concord server.
//!
//! Settings come from an optional `conf/application` file (YAML/TOML) with
//! `CONCORD_*` environment variables layered on top, e.g.
//! `CONCORD_PROCESS_ID=1`, `CONCORD_TOTAL_PROCESSES=5`,
//! `CONCORD_PEER_ADDRESSES=http://a:3000,http://b:3000,...`.

use std::sync::Arc;
use std::time::Duration;

use config::{Config, Environment};

use concord_common::ConcordError;
use concord_core::directory::PeerDirectory;
use concord_core::election::ElectionConfig;
use concord_core::peer_client::PeerClientConfig;

use crate::startup::logging::LoggingConfig;

const DEFAULT_TOTAL_PROCESSES: i64 = 3;
const DEFAULT_PEER_BASE_PORT: i64 = 3000;

/// Application configuration loaded from file and environment.
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    config: Config,
}

impl Configuration {
    pub fn new() -> Result<Self, ConcordError> {
        let config = Config::builder()
            .add_source(config::File::with_name("conf/application").required(false))
            .add_source(
                Environment::with_prefix("concord")
                    .separator("_")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConcordError::Config(e.to_string()))?;

        Ok(Self { config })
    }

    /// Wraps an already-built `Config` (used by tests).
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // ========================================================================
    // Process identity and peer table
    // ========================================================================

    pub fn process_id(&self) -> u32 {
        self.config.get_int("process.id").unwrap_or(0) as u32
    }

    pub fn total_processes(&self) -> u32 {
        self.config
            .get_int("total.processes")
            .unwrap_or(DEFAULT_TOTAL_PROCESSES) as u32
    }

    pub fn peer_base_port(&self) -> u16 {
        self.config
            .get_int("peer.base.port")
            .unwrap_or(DEFAULT_PEER_BASE_PORT) as u16
    }

    /// Base URL per process id. Either the explicit comma-separated
    /// `peer.addresses` list, or `http://127.0.0.1:<base_port + i>` for
    /// local multi-process runs.
    pub fn peer_addresses(&self) -> Vec<String> {
        if let Ok(list) = self.config.get_string("peer.addresses") {
            return list
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        let base = self.peer_base_port();
        (0..self.total_processes())
            .map(|i| format!("http://127.0.0.1:{}", base as u32 + i))
            .collect()
    }

    /// Resolves the immutable peer directory for this process.
    pub fn peer_directory(&self) -> Result<Arc<PeerDirectory>, ConcordError> {
        Ok(Arc::new(PeerDirectory::new(
            self.process_id(),
            self.peer_addresses(),
        )?))
    }

    // ========================================================================
    // Server configuration
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    /// Listen port; defaults to the derived peer port of the local process.
    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .map(|p| p as u16)
            .unwrap_or(self.peer_base_port() + self.process_id() as u16)
    }

    // ========================================================================
    // Protocol tuning
    // ========================================================================

    pub fn election_config(&self) -> ElectionConfig {
        let defaults = ElectionConfig::default();
        ElectionConfig {
            call_timeout: self
                .config
                .get_int("election.timeout.ms")
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(defaults.call_timeout),
            contest_delay: self
                .config
                .get_int("election.contest.delay.ms")
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(defaults.contest_delay),
        }
    }

    pub fn peer_client_config(&self) -> PeerClientConfig {
        let defaults = PeerClientConfig::default();
        PeerClientConfig {
            connect_timeout: self
                .config
                .get_int("peer.connect.timeout.ms")
                .map(|ms| Duration::from_millis(ms as u64))
                .unwrap_or(defaults.connect_timeout),
        }
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_settings(
            self.config.get_string("logging.dir").ok(),
            self.config.get_bool("logging.console").unwrap_or(true),
            self.config.get_bool("logging.file").unwrap_or(true),
            self.config
                .get_string("logging.level")
                .unwrap_or("info".to_string()),
        )
    }
}
