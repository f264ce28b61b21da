//! Issue tracker capability.
//!
//! The reconciler only needs to search, create and retitle issues, plus two
//! listing calls used once at startup to validate configuration. Anything
//! implementing [`IssueTracker`] can back the service; [`JiraClient`] is the
//! production implementation.

mod error;
mod jira;
mod query;

pub use error::TrackerError;
pub use jira::JiraClient;
pub use query::{IssueQuery, ProjectIdentity};

use crate::issues::{ExistingIssue, IssueContent, IssueRef};
use async_trait::async_trait;

/// A project known to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerProject {
    pub id: String,
    pub key: String,
    pub name: String,
}

/// An issue status known to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStatus {
    pub id: String,
    pub name: String,
}

/// Operations the reconciler needs from an issue tracker.
///
/// Implementations must not retry on their own behalf inside the reconciler's
/// decision flow; transport-level timeouts are theirs to enforce.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Returns every issue matching `query` exactly, oldest first where the
    /// tracker supports ordering.
    async fn search(&self, query: &IssueQuery) -> Result<Vec<ExistingIssue>, TrackerError>;

    /// Creates an issue.
    async fn create(&self, content: &IssueContent) -> Result<IssueRef, TrackerError>;

    /// Replaces the summary of issue `issue_id`.
    async fn update_summary(&self, issue_id: &str, summary: &str) -> Result<(), TrackerError>;

    /// Lists all projects visible to the configured credentials.
    async fn list_projects(&self) -> Result<Vec<TrackerProject>, TrackerError>;

    /// Lists all issue statuses.
    async fn list_statuses(&self) -> Result<Vec<TrackerStatus>, TrackerError>;
}
