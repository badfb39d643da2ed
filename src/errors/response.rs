use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::registry;

/// Standard error envelope.
///
/// `success`, `message` and `errors` are a compatibility surface shared with
/// existing clients: the field names are fixed, `message` is always a string,
/// and `errors` is serialized as `null` when there is no detail to attach.
/// Success responses use a separate envelope without an `errors` key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Always false for errors
    pub success: bool,
    /// Human-readable error message
    pub message: String,
    /// Additional error context, e.g. per-field validation messages
    pub errors: Option<Value>,
    /// HTTP status for the response, not part of the body
    #[serde(skip)]
    pub status: u16,
}

impl ErrorResponse {
    /// Create an error envelope. A missing message falls back to the default
    /// for the status code.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self {
            success: false,
            message: message.unwrap_or_else(|| registry::default_message(status).to_string()),
            errors: None,
            status,
        }
    }

    /// Create an error envelope carrying extra detail in `errors`.
    pub fn with_errors(status: u16, message: Option<String>, errors: Value) -> Self {
        let mut response = Self::new(status, message);
        response.errors = Some(errors);
        response
    }
}

/// Helpers for the common error shapes
impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, Some(message.into()))
    }

    pub fn unauthorized(message: Option<String>) -> Self {
        Self::new(401, message)
    }

    pub fn forbidden(message: Option<String>) -> Self {
        Self::new(403, message)
    }

    pub fn not_found(message: Option<String>) -> Self {
        Self::new(404, message)
    }

    pub fn validation_error(errors: Value, message: Option<String>) -> Self {
        Self::with_errors(422, message, errors)
    }

    pub fn server_error(message: Option<String>, errors: Option<Value>) -> Self {
        let mut response = Self::new(500, message);
        response.errors = errors;
        response
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(self.clone())).into_response();
        // Stash the envelope so the negotiation middleware can re-render it
        // for callers that do not accept JSON.
        response.extensions_mut().insert(self);
        response
    }
}
