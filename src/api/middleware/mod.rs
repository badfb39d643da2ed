pub mod logging;
pub mod negotiation;

pub use logging::logging_middleware;
pub use negotiation::{handle_panic, negotiate_errors};
