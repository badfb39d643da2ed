use axum::{
    body::Bytes,
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use crate::errors::classify::debug_responses_enabled;
use crate::errors::ErrorResponse;

/// Upper bound when buffering a boundary-error body for re-enveloping.
const MAX_BOUNDARY_BODY_BYTES: usize = 64 * 1024;

/// Content-negotiation boundary for error responses.
///
/// Two jobs: errors produced outside handler code (method mismatches on known
/// routes, extractor rejections) arrive as plain text and get re-enveloped so
/// every error reaching a JSON caller has the standard shape; and callers
/// that negotiate away from JSON get a minimal plain-text rendering instead
/// of the envelope.
pub async fn negotiate_errors(request: Request, next: Next) -> Response {
    let wants_json = wants_json(request.headers());

    let mut response = next.run(request).await;
    let status = response.status();

    if (status.is_client_error() || status.is_server_error())
        && response.extensions().get::<ErrorResponse>().is_none()
    {
        response = envelope_boundary_error(response).await;
    }

    if !wants_json {
        if let Some(envelope) = response.extensions().get::<ErrorResponse>() {
            return plain_text_rendering(envelope);
        }
    }

    response
}

/// Panic recovery into the standard envelope. Diagnostic detail only reaches
/// clients when debug responses are enabled.
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "request handler panicked".to_string()
    };

    error!("Handler panicked: {}", detail);

    if debug_responses_enabled() {
        ErrorResponse::server_error(
            Some(detail.clone()),
            Some(json!({
                "exception": "panic",
                "message": detail,
            })),
        )
        .into_response()
    } else {
        ErrorResponse::server_error(None, None).into_response()
    }
}

/// Does the caller expect a JSON response? A missing Accept header counts as
/// yes, matching the permissive default of the original clients.
fn wants_json(headers: &HeaderMap) -> bool {
    match headers.get(header::ACCEPT).and_then(|v| v.to_str().ok()) {
        None => true,
        Some(accept) => accept.contains("json") || accept.contains("*/*"),
    }
}

async fn envelope_boundary_error(response: Response) -> Response {
    let (parts, body) = response.into_parts();

    let bytes = axum::body::to_bytes(body, MAX_BOUNDARY_BODY_BYTES)
        .await
        .unwrap_or_else(|_| Bytes::new());
    let text = String::from_utf8_lossy(&bytes).trim().to_string();

    // An empty body falls back to the registry default for the status code.
    let message = if text.is_empty() { None } else { Some(text) };

    ErrorResponse::new(parts.status.as_u16(), message).into_response()
}

fn plain_text_rendering(envelope: &ErrorResponse) -> Response {
    let status =
        StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (status, envelope.message.clone()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::Value;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_wants_json() {
        assert!(wants_json(&HeaderMap::new()));
        assert!(wants_json(&accept("application/json")));
        assert!(wants_json(&accept("*/*")));
        assert!(wants_json(&accept("text/html, */*;q=0.8")));
        assert!(!wants_json(&accept("text/html")));
        assert!(!wants_json(&accept("text/plain")));
    }

    #[tokio::test]
    async fn test_boundary_error_with_empty_body_uses_registry() {
        let response = StatusCode::METHOD_NOT_ALLOWED.into_response();
        let enveloped = envelope_boundary_error(response).await;

        assert_eq!(enveloped.status(), StatusCode::METHOD_NOT_ALLOWED);

        let bytes = axum::body::to_bytes(enveloped.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(
            body["message"],
            "The requested method is not allowed for this resource"
        );
    }

    #[tokio::test]
    async fn test_boundary_error_keeps_rejection_message() {
        let response =
            (StatusCode::BAD_REQUEST, "Invalid JSON in request body").into_response();
        let enveloped = envelope_boundary_error(response).await;

        assert_eq!(enveloped.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(enveloped.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["message"], "Invalid JSON in request body");
    }

    #[test]
    fn test_plain_text_rendering_carries_status_and_message() {
        let envelope = ErrorResponse::not_found(None);
        let response = plain_text_rendering(&envelope);

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("text/plain"))
            .unwrap_or(false));
    }

    #[test]
    fn test_panic_without_debug_is_generic() {
        let response = handle_panic(Box::new("boom".to_string()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let stashed = response.extensions().get::<ErrorResponse>().unwrap();
        assert_eq!(
            stashed.message,
            "An unexpected error occurred on the server"
        );
        assert!(stashed.errors.is_none());
    }

    // Panic recovery runs inside negotiation, so a non-JSON caller still
    // gets the plain-text rendering when a handler panics.
    #[tokio::test]
    async fn test_recovered_panic_respects_accept() {
        use axum::{middleware, routing::get, Router};
        use tower::ServiceExt;
        use tower_http::catch_panic::CatchPanicLayer;

        async fn boom() -> String {
            panic!("kaboom")
        }

        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(middleware::from_fn(negotiate_errors));

        let request = axum::http::Request::builder()
            .uri("/boom")
            .header(header::ACCEPT, "text/html")
            .body(axum::body::Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        assert!(content_type.starts_with("text/plain"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            String::from_utf8_lossy(&bytes),
            "An unexpected error occurred on the server"
        );
    }
}
