//! Error taxonomy shared by every client operation.

/// Errors surfaced by the client. Nothing is retried internally; the first
/// failure of any call or batch is returned to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid client configuration (e.g. unusable base URL).
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// The login-status check at construction time failed.
    #[error("Authentication failed: {0}")]
    Auth(String),
    /// The service answered with a non-success status.
    #[error("Error response from server: {status}: {body}")]
    Api { status: u16, body: String },
    /// The service answered with a success status but an unusable payload.
    #[error("Unexpected response from server: {0}")]
    Protocol(String),
    /// A local precondition failed before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),
    /// Transport-level failure (DNS, TLS, connect, timeout).
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Archive error: {0}")]
    Zip(String),
}

pub type Result<T> = std::result::Result<T, Error>;
