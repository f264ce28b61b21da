//! Issues already on the tracker.

use chrono::{DateTime, FixedOffset};

/// Reference to a tracker issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    /// Tracker-internal id, used for updates.
    pub id: String,
    /// Human readable key, e.g. "OPS-42".
    pub key: String,
}

/// An issue returned by a tracker search. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingIssue {
    /// Tracker-internal id.
    pub id: String,
    /// Human readable key.
    pub key: String,
    /// Creation time as reported by the tracker.
    pub created_at: DateTime<FixedOffset>,
    /// Current summary.
    pub summary: String,
}

impl ExistingIssue {
    /// Returns a reference to this issue.
    #[must_use]
    pub fn to_ref(&self) -> IssueRef {
        IssueRef {
            id: self.id.clone(),
            key: self.key.clone(),
        }
    }
}
