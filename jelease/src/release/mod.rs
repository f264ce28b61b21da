//! Normalized release notifications.
//!
//! A [`ReleaseEvent`] is decoded from a newreleases.io webhook body. Only the
//! fields the reconciler needs are kept; everything else in the payload is
//! ignored. See <https://newreleases.io/webhooks> for the full payload.

mod error;

pub use error::DecodeError;

use serde::{Deserialize, Serialize};

/// A new release of a tracked project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseEvent {
    provider: String,
    project: String,
    version: String,
}

/// Wire shape of the webhook body.
#[derive(Debug, Deserialize)]
struct ReleasePayload {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

impl ReleaseEvent {
    /// Creates a release event, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MissingField`] if `project` or `version` is blank.
    pub fn new(
        provider: impl Into<String>,
        project: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, DecodeError> {
        let provider = provider.into().trim().to_string();
        let project = required(project.into(), "project")?;
        let version = required(version.into(), "version")?;
        Ok(Self {
            provider,
            project,
            version,
        })
    }

    /// Decodes a webhook body.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] if the body is not valid JSON or lacks a
    /// non-blank `project` or `version`.
    pub fn from_json(body: &[u8]) -> Result<Self, DecodeError> {
        let payload: ReleasePayload = serde_json::from_slice(body)?;
        Self::new(
            payload.provider.unwrap_or_default(),
            payload.project.unwrap_or_default(),
            payload.version.unwrap_or_default(),
        )
    }

    /// Release source, e.g. `github`. Informational only.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Project identifier, used as the dedup key and issue label.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Released version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }
}

fn required(value: String, field: &'static str) -> Result<String, DecodeError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DecodeError::MissingField { field });
    }
    Ok(trimmed.to_string())
}
