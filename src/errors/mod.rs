//! Standardized response envelope and error classification

pub mod classify;
pub mod registry;
pub mod response;

pub use classify::{set_debug_responses, ApiError, FieldErrors};
pub use response::ErrorResponse;
