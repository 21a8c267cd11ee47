//! Mutual-exclusion endpoints.

use actix_web::{Responder, Scope, get, post, web};
use tracing::debug;

use concord_core::model::{MutexReply, MutexRequest};

use crate::model::{ApiResult, AppState};

/// Ask for the critical section on behalf of this process.
#[post("/request-access")]
async fn request_access(data: web::Data<AppState>) -> impl Responder {
    match data.mutex.request_access().await {
        Ok(()) => ApiResult::http_ok("access requested"),
        Err(e) => ApiResult::http_from_error(&e),
    }
}

/// Inbound critical-section request from a peer.
#[post("/request")]
async fn receive_request(
    data: web::Data<AppState>,
    body: web::Json<MutexRequest>,
) -> impl Responder {
    data.mutex.receive_request(body.into_inner()).await;
    ApiResult::http_ok(())
}

/// Inbound permission grant from a peer.
#[post("/reply")]
async fn receive_reply(data: web::Data<AppState>, body: web::Json<MutexReply>) -> impl Responder {
    debug!(from = body.process_id, "mutex reply received");
    data.mutex.receive_reply();
    ApiResult::http_ok(())
}

/// Leave the critical section and flush deferred replies.
#[post("/release")]
async fn release_access(data: web::Data<AppState>) -> impl Responder {
    match data.mutex.release_access().await {
        Ok(()) => ApiResult::http_ok("access released"),
        Err(e) => ApiResult::http_from_error(&e),
    }
}

#[get("/status")]
async fn get_status(data: web::Data<AppState>) -> impl Responder {
    ApiResult::http_ok(data.mutex.status())
}

pub fn routes() -> Scope {
    web::scope("/mutex")
        .service(request_access)
        .service(receive_request)
        .service(receive_reply)
        .service(release_access)
        .service(get_status)
}
