use std::any::type_name;
use std::backtrace::Backtrace;
use std::collections::BTreeMap;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use super::response::ErrorResponse;

/// Per-field validation messages keyed by input field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

static DEBUG_RESPONSES: AtomicBool = AtomicBool::new(false);

/// Enable or disable diagnostic payloads on 500 responses. Set once at
/// startup from configuration; defaults to off.
pub fn set_debug_responses(enabled: bool) {
    DEBUG_RESPONSES.store(enabled, Ordering::Relaxed);
}

pub fn debug_responses_enabled() -> bool {
    DEBUG_RESPONSES.load(Ordering::Relaxed)
}

/// Application error taxonomy.
///
/// Every failure a request can produce is expressed as one of these variants
/// and rendered through [`ApiError::to_response`], so the envelope never
/// varies by call site. Handlers return `Result<_, ApiError>` and let `?`
/// funnel lower-level errors here.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A referenced entity does not exist. Carries the entity type name,
    /// e.g. `"Product"`.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// Request payload failed validation.
    #[error("request validation failed")]
    Validation(FieldErrors),

    /// No credentials were presented where credentials are required.
    #[error("authentication required")]
    Unauthenticated,

    /// Credentials were presented but do not grant access.
    #[error("permission denied")]
    Forbidden,

    /// No route matched the request path.
    #[error("route not found")]
    RouteNotFound,

    /// The path matched but the method is not supported.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// Any other failure, with diagnostics captured at wrap time. The
    /// diagnostics only reach clients when debug responses are enabled.
    /// The backtrace is rendered eagerly; capture is the expensive part
    /// either way and a `String` keeps the variant plain data.
    #[error("{inner}")]
    Internal {
        inner: anyhow::Error,
        type_name: &'static str,
        location: &'static Location<'static>,
        backtrace: String,
    },
}

impl ApiError {
    /// Not-found error for an entity type, e.g. `ApiError::not_found("Product")`.
    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }

    /// Wrap any error as an internal failure, capturing its type name, the
    /// call site and a backtrace.
    #[track_caller]
    pub fn internal<E: Into<anyhow::Error>>(source: E) -> Self {
        Self::Internal {
            type_name: type_name::<E>(),
            location: Location::caller(),
            backtrace: Backtrace::force_capture().to_string(),
            inner: source.into(),
        }
    }

    /// Convert to the standard error envelope. `debug` controls whether
    /// internal errors expose their diagnostics in the `errors` payload.
    pub fn to_response(&self, debug: bool) -> ErrorResponse {
        match self {
            Self::NotFound { resource } => ErrorResponse::not_found(Some(format!(
                "The requested {} could not be found",
                humanize(resource)
            ))),
            Self::Validation(errors) => ErrorResponse::validation_error(json!(errors), None),
            Self::Unauthenticated => ErrorResponse::unauthorized(None),
            Self::Forbidden => ErrorResponse::forbidden(None),
            Self::RouteNotFound => ErrorResponse::not_found(None),
            Self::MethodNotAllowed => ErrorResponse::new(405, None),
            Self::Internal {
                inner,
                type_name,
                location,
                backtrace,
            } => {
                if debug {
                    ErrorResponse::server_error(
                        Some(inner.to_string()),
                        Some(json!({
                            "exception": type_name,
                            "file": location.file(),
                            "line": location.line(),
                            "trace": backtrace_lines(backtrace),
                        })),
                    )
                } else {
                    ErrorResponse::server_error(None, None)
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal {
            inner, location, ..
        } = &self
        {
            error!(
                "Unhandled error at {}:{}: {:#}",
                location.file(),
                location.line(),
                inner
            );
        }

        self.to_response(debug_responses_enabled()).into_response()
    }
}

/// Convert an entity type name to the wording used in not-found messages:
/// `ProductVariant` becomes `product variant`.
fn humanize(resource: &str) -> String {
    let short = resource.rsplit("::").next().unwrap_or(resource);

    let mut name = String::with_capacity(short.len() + 4);
    for (i, ch) in short.chars().enumerate() {
        if ch.is_uppercase() && i > 0 {
            name.push(' ');
        }
        name.extend(ch.to_lowercase());
    }
    name
}

fn backtrace_lines(backtrace: &str) -> Vec<String> {
    backtrace
        .lines()
        .map(|line| line.trim().to_string())
        .collect()
}
