//! Reconciliation error types.

use crate::tracker::TrackerError;
use thiserror::Error;

/// Reasons a reconciliation failed. None of these are retried.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Searching for existing issues failed; nothing was created.
    #[error("Error response from Jira when searching previous issues: {0}")]
    Query(#[source] TrackerError),

    /// Creating the issue failed.
    #[error("Error response from Jira when creating issue: {0}")]
    Create(#[source] TrackerError),

    /// Updating the canonical issue failed.
    #[error("Error response from Jira when updating issue {key}: {source}")]
    Update {
        key: String,
        #[source]
        source: TrackerError,
    },
}
