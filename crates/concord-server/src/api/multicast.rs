//! Total-order multicast endpoints.

use actix_web::{Responder, Scope, get, post, web};
use serde::{Deserialize, Serialize};

use concord_core::model::{AckMessage, MulticastMessage};

use crate::model::{ApiResult, AppState};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SendMessageParam {
    pub content: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayAckParam {
    pub message_id: String,
    pub delay_ms: u64,
}

/// Multicast a payload to every process. Responds with the constructed
/// message; delivery happens asynchronously once the ACK quorum completes.
#[post("/send")]
async fn send_message(data: web::Data<AppState>, body: web::Json<SendMessageParam>) -> impl Responder {
    let message = data.multicast.send_message(body.into_inner().content).await;
    ApiResult::http_ok(message)
}

/// Inbound multicast message from a peer.
#[post("/receive")]
async fn receive_message(
    data: web::Data<AppState>,
    body: web::Json<MulticastMessage>,
) -> impl Responder {
    data.multicast.receive_message(body.into_inner());
    ApiResult::http_ok(())
}

/// Inbound acknowledgement.
#[post("/ack")]
async fn receive_ack(data: web::Data<AppState>, body: web::Json<AckMessage>) -> impl Responder {
    data.multicast.receive_ack(body.into_inner());
    ApiResult::http_ok(())
}

/// Delay the next outgoing ACK for one message id (test hook for
/// reordering scenarios).
#[post("/delay-ack")]
async fn set_delayed_ack(
    data: web::Data<AppState>,
    body: web::Json<DelayAckParam>,
) -> impl Responder {
    let param = body.into_inner();
    data.multicast
        .set_delayed_ack(param.message_id.clone(), param.delay_ms);
    ApiResult::http_ok(format!(
        "ack for {} will be delayed by {} ms",
        param.message_id, param.delay_ms
    ))
}

#[get("/queue")]
async fn get_queue(data: web::Data<AppState>) -> impl Responder {
    ApiResult::http_ok(data.multicast.queue())
}

#[get("/status")]
async fn get_status(data: web::Data<AppState>) -> impl Responder {
    ApiResult::http_ok(data.multicast.status())
}

pub fn routes() -> Scope {
    web::scope("/multicast")
        .service(send_message)
        .service(receive_message)
        .service(receive_ack)
        .service(set_delayed_ack)
        .service(get_queue)
        .service(get_status)
}
