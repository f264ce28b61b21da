//! Reconciliation outcomes.

use crate::issues::{IssueContent, IssueRef};

/// What a reconciliation did, or in dry-run mode, would have done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No matching issue existed, so one was created.
    Created {
        /// The created issue. `None` in dry-run mode.
        issue: Option<IssueRef>,
        /// Content sent to the tracker.
        content: IssueContent,
        /// Whether the tracker call was suppressed.
        dry_run: bool,
    },

    /// The canonical matching issue had its summary refreshed.
    Updated {
        /// The canonical issue.
        issue: IssueRef,
        /// Summary before the update.
        previous_summary: String,
        /// Summary after the update.
        summary: String,
        /// Other matching issues, left untouched.
        duplicates: Vec<IssueRef>,
        /// Whether the tracker call was suppressed.
        dry_run: bool,
    },
}

impl Outcome {
    /// Returns the outcome as a string for logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
        }
    }

    /// Returns whether no tracker mutation was made.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        match self {
            Self::Created { dry_run, .. } | Self::Updated { dry_run, .. } => *dry_run,
        }
    }

    /// Returns the key of the affected issue, if known.
    #[must_use]
    pub fn issue_key(&self) -> Option<&str> {
        match self {
            Self::Created { issue, .. } => issue.as_ref().map(|i| i.key.as_str()),
            Self::Updated { issue, .. } => Some(&issue.key),
        }
    }
}
