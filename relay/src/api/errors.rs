use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::engine::errors::RequestError;

/// Maps `spec.md` §7's error-kind → HTTP-status table. No internal state is
/// leaked in error bodies — only the error's own message.
impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match &self {
            RequestError::InvalidInput(_) | RequestError::InvalidSignature(_) => {
                StatusCode::BAD_REQUEST
            }
            RequestError::NotFound => StatusCode::NOT_FOUND,
            RequestError::InvalidState => StatusCode::CONFLICT,
            RequestError::Enclave(_) | RequestError::ChainClient(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
