//! Response assembly.
//!
//! # Responsibilities
//! - Merge operator headers with the `X-Server-Time` stamp
//! - Default the content type to JSON unless a header file sets one
//!
//! # Design Decisions
//! - Always 200: the endpoint has no error responses of its own

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Header carrying the server's clock in Unix milliseconds.
pub const X_SERVER_TIME: HeaderName = HeaderName::from_static("x-server-time");

/// Current time in Unix milliseconds; zero if the clock is before the epoch.
pub fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// Build the response for one request.
pub fn build_response(custom: HeaderMap, body: Vec<u8>, now_millis: u128) -> Response {
    let mut headers = custom;
    headers.append(X_SERVER_TIME, HeaderValue::from(now_millis as u64));
    if !headers.contains_key(header::CONTENT_TYPE) {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
    }

    (StatusCode::OK, headers, Body::from(body)).into_response()
}
