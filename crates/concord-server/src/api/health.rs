//! Health and service-index endpoints.

use actix_web::{Responder, Scope, get, web};
use serde::Serialize;

use concord_core::model::{ElectionStatus, MulticastStatus, MutexStatus, ProcessId};

use crate::model::{ApiResult, AppState};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub process_id: ProcessId,
    pub status: &'static str,
    pub election: ElectionStatus,
    pub mutex: MutexStatus,
    pub multicast: MulticastStatus,
}

/// Aggregate status of all three coordinators.
#[get("/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    ApiResult::http_ok(HealthResponse {
        process_id: data.directory.process_id(),
        status: "running",
        election: data.election.status(),
        mutex: data.mutex.status(),
        multicast: data.multicast.status(),
    })
}

/// Service description with the available endpoints.
#[get("/")]
async fn index(data: web::Data<AppState>) -> impl Responder {
    ApiResult::http_ok(serde_json::json!({
        "service": "Concord - distributed coordination",
        "processId": data.directory.process_id(),
        "totalProcesses": data.directory.total_processes(),
        "endpoints": {
            "election": ["/election/start", "/election/message", "/election/status"],
            "mutex": [
                "/mutex/request-access",
                "/mutex/request",
                "/mutex/reply",
                "/mutex/release",
                "/mutex/status"
            ],
            "multicast": [
                "/multicast/send",
                "/multicast/receive",
                "/multicast/ack",
                "/multicast/delay-ack",
                "/multicast/queue",
                "/multicast/status"
            ],
            "health": ["/health"]
        }
    }))
}

pub fn routes() -> Scope {
    web::scope("").service(health).service(index)
}
