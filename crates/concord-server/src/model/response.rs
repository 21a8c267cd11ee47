//! Uniform response envelope for the HTTP API.

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

use concord_common::ConcordError;

/// `{code, message, data}` wrapper every endpoint responds with. Code 0 is
/// success; errors carry the HTTP status as code.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResult<T> {
    pub fn success(data: T) -> ApiResult<T> {
        ApiResult {
            code: 0,
            message: "success".to_string(),
            data,
        }
    }

    pub fn http_ok(data: T) -> HttpResponse {
        HttpResponse::Ok().json(ApiResult::success(data))
    }
}

impl ApiResult<()> {
    pub fn http_error(status: u16, message: String) -> HttpResponse {
        HttpResponseBuilder::new(StatusCode::from_u16(status).unwrap_or_default()).json(ApiResult {
            code: status as i32,
            message,
            data: (),
        })
    }

    /// Maps a coordinator error onto the envelope: invariant violations are
    /// the caller's fault (409), everything else is a server error.
    pub fn http_from_error(error: &ConcordError) -> HttpResponse {
        let status = if error.is_client_error() { 409 } else { 500 };
        Self::http_error(status, error.to_string())
    }
}
