/// Default client-facing messages keyed by HTTP status code.
///
/// This table is the single source of truth for error wording: callers pass
/// a status code and let [`default_message`] supply the text unless they have
/// something more specific to say.
pub const DEFAULT_MESSAGES: &[(u16, &str)] = &[
    // Client errors
    (400, "The request was invalid or cannot be served"),
    (401, "Authentication is required to access this resource"),
    (402, "Payment is required to access this resource"),
    (403, "You do not have permission to access this resource"),
    (404, "The requested resource was not found"),
    (405, "The requested method is not allowed for this resource"),
    (409, "The request conflicts with the current state of the resource"),
    (422, "The request data was invalid"),
    (429, "Too many requests have been made to this resource"),
    // Server errors
    (500, "An unexpected error occurred on the server"),
    (501, "The requested functionality is not implemented"),
    (502, "The server received an invalid response from the upstream server"),
    (503, "The server is temporarily unable to handle the request"),
    (504, "The server did not receive a timely response from the upstream server"),
];

/// Fallback message for status codes without a registered default.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Get the default message for a status code.
pub fn default_message(status: u16) -> &'static str {
    DEFAULT_MESSAGES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, message)| *message)
        .unwrap_or(UNKNOWN_ERROR_MESSAGE)
}
