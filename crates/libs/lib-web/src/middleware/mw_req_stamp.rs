//! # Request Stamping Middleware
//!
//! Gives every request an id and a receive time. The id is taken from an
//! incoming `X-Request-ID` header when a proxy already set one, otherwise a
//! fresh UUID v4 is generated. It is echoed back in the response headers.
//!
//! Handlers can read the stamp via `Extension<RequestStamp>`:
//!
//! ```rust,ignore
//! async fn handler(Extension(stamp): Extension<RequestStamp>) -> String {
//!     format!("Request ID: {}", stamp.id)
//! }
//! ```

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest incoming request id that is reused as-is.
const MAX_FORWARDED_ID_LEN: usize = 128;

#[derive(Clone, Debug)]
pub struct RequestStamp {
    pub id: String,
    pub received_at: DateTime<Utc>,
}

impl RequestStamp {
    fn from_request(req: &Request) -> Self {
        let forwarded = req
            .headers()
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.len() <= MAX_FORWARDED_ID_LEN);

        Self {
            id: forwarded
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            received_at: Utc::now(),
        }
    }
}

pub async fn stamp_req(mut req: Request, next: Next) -> Response {
    let stamp = RequestStamp::from_request(&req);
    req.extensions_mut().insert(stamp.clone());

    let mut res = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&stamp.id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Request id of the current request, or `"unknown"` outside the stamping layer.
pub fn request_id(req: &Request) -> String {
    req.extensions()
        .get::<RequestStamp>()
        .map(|s| s.id.clone())
        .unwrap_or_else(|| "unknown".to_string())
}
