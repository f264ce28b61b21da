//! Server error types.

/// Errors that can occur while starting or running the service.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration is invalid or doesn't match the tracker.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Jira client initialization errors.
    #[error(transparent)]
    Tracker(#[from] crate::tracker::TrackerError),

    /// Binding or serving failed.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns true if the error happened before the service started serving.
    #[must_use]
    pub fn is_startup(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Tracker(_))
    }
}
