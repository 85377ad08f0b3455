//! # Response Mapping Middleware
//!
//! Runs after every handler. Server errors are logged with the request id
//! (the error body itself is already generic, see `AppError::into_response`),
//! and JSON API responses are marked `Cache-Control: no-store` since they
//! carry per-account data. Body-limit rejections from axum extractors are
//! plain text; they are rewritten into the usual `{error, code}` body.

use axum::{
    extract::Request,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use lib_core::AppError;
use tracing::{error, warn};

use super::mw_req_stamp::request_id;

pub async fn map_res(req: Request, next: Next) -> Response {
    let request_id = request_id(&req);
    let is_api = req.uri().path().starts_with("/api/");

    let mut res = next.run(req).await;

    if res.status() == StatusCode::PAYLOAD_TOO_LARGE && !is_json(&res) {
        warn!(request_id = %request_id, "[RESPONSE] Request body over limit");
        res = AppError::PayloadTooLarge.into_response();
    }

    if res.status().is_server_error() {
        error!(request_id = %request_id, status = res.status().as_u16(), "[RESPONSE] Server error");
    }
    if is_api {
        res.headers_mut()
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    }

    res
}

fn is_json(res: &Response) -> bool {
    res.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"))
}
