use thiserror::Error;

/// Failure talking to the backend of record.
///
/// Callers turn these into categorical messages; the text is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Could not decode backend response: {0}")]
    Decode(String),
    #[error("Invalid endpoint: {0}")]
    InvalidUrl(String),
}
