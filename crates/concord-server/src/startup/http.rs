//! HTTP server setup.

use std::sync::Arc;

use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::api;
use crate::model::AppState;

/// Creates and binds the process's HTTP server exposing the election,
/// mutex, and multicast endpoints plus health and index.
pub fn main_server(
    app_state: Arc<AppState>,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::from(app_state.clone()))
            .service(api::election::routes())
            .service(api::mutex::routes())
            .service(api::multicast::routes())
            .service(api::health::routes())
    })
    .bind((address, port))?
    .run())
}
