//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Network-level failure: connection refused, DNS, broken pipe.
    #[error("transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status code.
    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Body arrived but did not match the expected JSON shape.
    #[error("unexpected payload: {0}")]
    Payload(String),

    /// Request exceeded the configured client timeout (APR_REQUEST_TIMEOUT_SECS).
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// Summary stream failed: transport drop or an explicit error event.
    #[error("summary stream failed: {0}")]
    Stream(String),

    #[error("UI error: {0}")]
    Ui(String),
}
