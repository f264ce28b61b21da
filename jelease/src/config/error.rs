//! Configuration error types.

use crate::templates::TemplateError;
use crate::tracker::TrackerError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
///
/// All of these are fatal: the service must not start serving.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse config file '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A required option has no value.
    #[error("Missing required option '{option}'")]
    MissingOption { option: &'static str },

    /// The tracker URL is not a valid absolute URL.
    #[error("Invalid Jira URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    /// The description template is malformed.
    #[error("Invalid description template: {0}")]
    InvalidTemplate(#[from] TemplateError),

    /// The configured project does not exist on the tracker.
    #[error("Project {project} does not exist on your Jira server")]
    ProjectNotFound { project: String },

    /// The configured default status does not exist on the tracker.
    #[error("Status {status} does not exist on your Jira server")]
    StatusNotFound { status: String },

    /// The tracker could not be queried during validation.
    #[error("Error response from Jira when retrieving {what}: {source}")]
    Tracker {
        what: &'static str,
        #[source]
        source: TrackerError,
    },
}
