//! Main entry point for a Concord process.

use std::sync::Arc;

use concord_server::model::{AppState, Configuration};
use concord_server::startup;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new()?;
    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    let address = configuration.server_address();
    let port = configuration.server_port();

    let app_state = Arc::new(AppState::new(configuration)?);
    info!(
        process_id = app_state.directory.process_id(),
        total_processes = app_state.directory.total_processes(),
        "starting concord process"
    );

    let server = startup::main_server(app_state.clone(), address.clone(), port)?;
    info!("listening on {}:{}", address, port);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    info!("concord process shutdown complete");
    Ok(())
}
