//! Leader-election endpoints.

use actix_web::{Responder, Scope, get, post, web};

use concord_core::model::ElectionMessage;

use crate::model::{ApiResult, AppState};

/// Trigger an election round on this process.
#[post("/start")]
async fn start_election(data: web::Data<AppState>) -> impl Responder {
    data.election.start_election().await;
    ApiResult::http_ok("election started")
}

/// Inbound ELECTION/COORDINATOR message from a peer. Answering the call at
/// all is the Bully protocol's implicit OK.
#[post("/message")]
async fn receive_message(
    data: web::Data<AppState>,
    body: web::Json<ElectionMessage>,
) -> impl Responder {
    let reply = data.election.receive_message(body.into_inner());
    ApiResult::http_ok(reply)
}

#[get("/status")]
async fn get_status(data: web::Data<AppState>) -> impl Responder {
    ApiResult::http_ok(data.election.status())
}

pub fn routes() -> Scope {
    web::scope("/election")
        .service(start_election)
        .service(receive_message)
        .service(get_status)
}
