//! Release payload decoding error types.

use thiserror::Error;

/// Errors that can occur while decoding an inbound release notification.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not a JSON object of the expected shape.
    #[error("Couldn't decode request body as a release: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A required field is absent or blank.
    #[error("Release is missing required field '{field}'")]
    MissingField { field: &'static str },
}
