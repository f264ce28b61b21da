//! Issue tracker error types.

use thiserror::Error;

/// Errors that can occur while talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The request could not be sent or the response not received.
    #[error("Failed to reach Jira: {0}")]
    Transport(#[from] reqwest::Error),

    /// The tracker answered with a non-success status.
    #[error("Jira responded with {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("Failed to parse Jira response: {0}")]
    Decode(String),

    /// An endpoint URL could not be built from the configured base URL.
    #[error("Invalid Jira URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
