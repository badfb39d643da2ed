use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::Response,
};

use super::handlers::AppState;
use crate::errors::ApiError;

/// Bearer-token guard for mutating product routes.
///
/// When no write token is configured the guard is inert (development
/// default). A missing credential is classified as unauthenticated, a
/// mismatched one as forbidden. Read methods always pass through.
pub async fn require_write_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !is_write_method(request.method()) {
        return Ok(next.run(request).await);
    }

    let Some(expected) = state.write_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    match bearer_token(request.headers()) {
        None => Err(ApiError::Unauthenticated),
        Some(token) if token == expected => Ok(next.run(request).await),
        Some(_) => Err(ApiError::Forbidden),
    }
}

fn is_write_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
