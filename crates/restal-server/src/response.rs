//! Response formatting shared by handlers and error mapping.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

/// Every response body is JSON.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Build a JSON response from already-serialized bytes.
pub fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (status, [(header::CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}
