//! Endpoint tests against the real handler stack.
//!
//! Peers are unreachable here (nothing listens on the configured ports), so
//! fan-outs fall into the logged no-response path; what these tests pin down
//! is the HTTP surface: routing, request/response shapes, and the envelope.

use std::sync::Arc;

use actix_web::{App, test, web};
use serde_json::Value;

use concord_server::api;
use concord_server::model::{AppState, Configuration};

fn app_state(process_id: u32, total: u32) -> Arc<AppState> {
    let config = config::Config::builder()
        .set_override("process.id", process_id as i64)
        .unwrap()
        .set_override("total.processes", total as i64)
        .unwrap()
        // Ports far from anything the test host might listen on.
        .set_override("peer.base.port", 39200)
        .unwrap()
        .set_override("election.timeout.ms", 100)
        .unwrap()
        .build()
        .unwrap();
    Arc::new(AppState::new(Configuration::from_config(config)).unwrap())
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::from($state))
                .service(api::election::routes())
                .service(api::mutex::routes())
                .service(api::multicast::routes())
                .service(api::health::routes()),
        )
        .await
    };
}

#[actix_web::test]
async fn election_status_reports_initial_state() {
    let app = test_app!(app_state(1, 3));

    let req = test::TestRequest::get().uri("/election/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["processId"], 1);
    assert_eq!(body["data"]["coordinatorId"], Value::Null);
    assert_eq!(body["data"]["isCoordinator"], false);
    assert_eq!(body["data"]["inElection"], false);
}

#[actix_web::test]
async fn election_message_from_lower_id_gets_ok() {
    let app = test_app!(app_state(2, 3));

    let req = test::TestRequest::post()
        .uri("/election/message")
        .set_json(serde_json::json!({"processId": 0, "type": "ELECTION"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["shouldReplyOk"], true);
}

#[actix_web::test]
async fn coordinator_announcement_updates_status() {
    let app = test_app!(app_state(0, 3));

    let req = test::TestRequest::post()
        .uri("/election/message")
        .set_json(serde_json::json!({"processId": 2, "type": "COORDINATOR"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["shouldReplyOk"], false);

    let req = test::TestRequest::get().uri("/election/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["coordinatorId"], 2);
    assert_eq!(body["data"]["isCoordinator"], false);
}

#[actix_web::test]
async fn mutex_request_is_queued_and_clock_advances() {
    let app = test_app!(app_state(0, 3));

    let req = test::TestRequest::post()
        .uri("/mutex/request")
        .set_json(serde_json::json!({"processId": 1, "timestamp": 5}))
        .to_request();
    let response = test::call_service(&app, req).await;
    assert!(response.status().is_success());

    let req = test::TestRequest::get().uri("/mutex/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["queueLength"], 1);
    assert_eq!(body["data"]["logicalClock"], 6);
    assert_eq!(body["data"]["inCriticalSection"], false);
}

#[actix_web::test]
async fn mutex_release_without_entry_is_a_conflict() {
    let app = test_app!(app_state(0, 3));

    let req = test::TestRequest::post().uri("/mutex/release").to_request();
    let response = test::call_service(&app, req).await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
async fn multicast_receive_appears_in_queue() {
    let app = test_app!(app_state(1, 3));

    let req = test::TestRequest::post()
        .uri("/multicast/receive")
        .set_json(serde_json::json!({
            "id": "msg-0-7",
            "senderId": 0,
            "timestamp": 5,
            "content": "hello"
        }))
        .to_request();
    let response = test::call_service(&app, req).await;
    assert!(response.status().is_success());

    let req = test::TestRequest::get().uri("/multicast/queue").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let queue = body["data"].as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["id"], "msg-0-7");
    assert_eq!(queue[0]["acksReceived"], 1);
    assert_eq!(queue[0]["acksNeeded"], 3);
    assert_eq!(queue[0]["delivered"], false);
}

#[actix_web::test]
async fn multicast_send_returns_message_and_delay_ack_sticks() {
    let app = test_app!(app_state(0, 3));

    let req = test::TestRequest::post()
        .uri("/multicast/send")
        .set_json(serde_json::json!({"content": "payload"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["senderId"], 0);
    assert_eq!(body["data"]["timestamp"], 1);
    assert_eq!(body["data"]["content"], "payload");
    let id = body["data"]["id"].as_str().unwrap();
    assert!(id.starts_with("msg-0-"));

    let req = test::TestRequest::post()
        .uri("/multicast/delay-ack")
        .set_json(serde_json::json!({"messageId": id, "delayMs": 500}))
        .to_request();
    let response = test::call_service(&app, req).await;
    assert!(response.status().is_success());

    let req = test::TestRequest::get().uri("/multicast/status").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["delayedAck"]["messageId"], id);
    assert_eq!(body["data"]["delayedAck"]["delayMs"], 500);
}

#[actix_web::test]
async fn health_aggregates_all_three_coordinators() {
    let app = test_app!(app_state(1, 3));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["processId"], 1);
    assert_eq!(body["data"]["status"], "running");
    assert_eq!(body["data"]["election"]["processId"], 1);
    assert_eq!(body["data"]["mutex"]["queueLength"], 0);
    assert_eq!(body["data"]["multicast"]["totalProcesses"], 3);
}

#[actix_web::test]
async fn index_lists_endpoints() {
    let app = test_app!(app_state(0, 3));

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["data"]["processId"], 0);
    assert!(
        body["data"]["endpoints"]["multicast"]
            .as_array()
            .unwrap()
            .contains(&Value::String("/multicast/send".to_string()))
    );
}
