//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use restal_adapter_pg::AdapterError;
use serde_json::json;

use crate::response::json_response;

/// Adapter errors surfaced over HTTP as `{"error": "<message>"}` with the
/// status matching the error kind.
#[derive(Debug)]
pub struct ApiError(pub AdapterError);

impl From<AdapterError> for ApiError {
    fn from(err: AdapterError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AdapterError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
            AdapterError::MalformedStatement | AdapterError::Execution(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let body = json!({ "error": self.0.to_string() });
        json_response(status, serde_json::to_vec(&body).unwrap_or_default())
    }
}
