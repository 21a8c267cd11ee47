//! Multi-file logging setup.
//!
//! Besides console output, each protocol writes to its own rolling log file
//! so one coordinator's traffic can be followed in isolation:
//!
//! | Log file       | Target prefix                |
//! |----------------|------------------------------|
//! | concord.log    | (all events)                 |
//! | election.log   | concord_core::election       |
//! | mutex.log      | concord_core::mutex          |
//! | multicast.log  | concord_core::multicast      |
//! | remote.log     | concord_core::peer_client    |
//!
//! Files land in `~/concord/logs` unless overridden via configuration.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Per-protocol log file routed by tracing target.
struct ComponentLogDef {
    file_name: &'static str,
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "election.log",
        targets: &["concord_core::election"],
    },
    ComponentLogDef {
        file_name: "mutex.log",
        targets: &["concord_core::mutex"],
    },
    ComponentLogDef {
        file_name: "multicast.log",
        targets: &["concord_core::multicast"],
    },
    ComponentLogDef {
        file_name: "remote.log",
        targets: &["concord_core::peer_client"],
    },
];

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_dir: PathBuf,
    pub console_output: bool,
    pub file_logging: bool,
    pub level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_output: true,
            file_logging: true,
            level: Level::INFO,
        }
    }
}

impl LoggingConfig {
    /// Builds from the application configuration values.
    pub fn from_settings(
        log_dir: Option<String>,
        console_output: bool,
        file_logging: bool,
        level: String,
    ) -> Self {
        Self {
            log_dir: log_dir.map(PathBuf::from).unwrap_or_else(default_log_dir),
            console_output,
            file_logging,
            level: level.parse().unwrap_or(Level::INFO),
        }
    }
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{}/concord/logs", home))
}

/// Keeps the non-blocking file writers alive; must outlive the process.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

/// Initializes the global tracing subscriber: a console layer honoring
/// `RUST_LOG`, the root `concord.log`, and the per-protocol files.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
        layers.push(Box::new(
            fmt::layer().with_target(true).with_filter(filter),
        ));
    }

    if config.file_logging {
        // Root file captures everything.
        let root_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_dir, "concord.log");
        let (root_writer, root_guard) = tracing_appender::non_blocking(root_appender);
        guards.push(root_guard);

        let root_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
        layers.push(Box::new(
            fmt::layer()
                .with_writer(root_writer)
                .with_target(true)
                .with_ansi(false)
                .with_filter(root_filter),
        ));

        // Component files pick up everything from their targets; level
        // control stays with the root file and console.
        for component in COMPONENT_LOGS {
            let appender =
                RollingFileAppender::new(Rotation::DAILY, &config.log_dir, component.file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let mut targets = Targets::new();
            for target in component.targets {
                targets = targets.with_target(*target, LevelFilter::TRACE);
            }
            layers.push(Box::new(
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_ansi(false)
                    .with_filter(targets),
            ));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            component_files = COMPONENT_LOGS.len(),
            "file logging initialized"
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(config.console_output);
        assert!(config.file_logging);
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_logging_config_from_settings() {
        let config = LoggingConfig::from_settings(
            Some("/tmp/concord-test-logs".to_string()),
            false,
            true,
            "debug".to_string(),
        );
        assert_eq!(config.log_dir, PathBuf::from("/tmp/concord-test-logs"));
        assert!(!config.console_output);
        assert_eq!(config.level, Level::DEBUG);
    }

    #[test]
    fn test_component_log_definitions() {
        for component in COMPONENT_LOGS {
            assert!(component.file_name.ends_with(".log"));
            assert!(!component.targets.is_empty());
        }
    }
}
