//! Release to issue reconciliation.
//!
//! For every release the reconciler makes sure exactly one open update issue
//! describes the newest version of the project:
//! 1. Search the tracker for issues in the default status tagged with the
//!    project
//! 2. Create an issue if there is none
//! 3. Otherwise retitle the oldest one (the canonical issue) and leave the
//!    rest alone as duplicates
//!
//! The reconciler keeps no state between calls; the tracker is the source of
//! truth. Two concurrent releases for a project without an issue can both
//! create one. The duplicate is absorbed by the canonical-issue rule on the
//! next release.

mod error;
mod outcome;

pub use error::ReconcileError;
pub use outcome::Outcome;

use crate::config::IssueConfig;
use crate::issues::{render_issue, ExistingIssue, IssueRef};
use crate::release::ReleaseEvent;
use crate::templates::generate_issue_summary;
use crate::tracker::{IssueQuery, IssueTracker};
use tracing::{debug, info, info_span, warn, Instrument};

/// The canonical issue among a search result and its duplicates.
#[derive(Debug, PartialEq, Eq)]
pub struct Selection<'a> {
    /// The issue to keep up to date.
    pub canonical: &'a ExistingIssue,
    /// Every other issue, in result order.
    pub duplicates: Vec<&'a ExistingIssue>,
}

/// Picks the canonical issue: the earliest created, ties going to the one
/// listed first. Returns `None` for an empty result.
#[must_use]
pub fn select_canonical(issues: &[ExistingIssue]) -> Option<Selection<'_>> {
    let (canonical_index, canonical) = issues
        .iter()
        .enumerate()
        .reduce(|oldest, current| {
            if current.1.created_at < oldest.1.created_at {
                current
            } else {
                oldest
            }
        })?;

    let duplicates = issues
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != canonical_index)
        .map(|(_, issue)| issue)
        .collect();

    Some(Selection {
        canonical,
        duplicates,
    })
}

/// Reconciles a release with the tracker's issues.
///
/// Creates the project's update issue if none matches, otherwise updates the
/// summary of the canonical one. Only the summary is changed on update, and
/// the update is sent even when the summary is already current.
///
/// In dry-run mode no create or update call is made; the returned
/// [`Outcome`] describes what would have been done.
///
/// # Errors
///
/// Returns [`ReconcileError`] if any tracker call fails. A failed search
/// aborts without creating anything.
pub async fn reconcile(
    event: &ReleaseEvent,
    tracker: &dyn IssueTracker,
    config: &IssueConfig,
) -> Result<Outcome, ReconcileError> {
    let span = info_span!(
        "reconcile",
        provider = %event.provider(),
        project = %event.project(),
        version = %event.version()
    );

    async {
        let query = IssueQuery::for_release(event, config);
        debug!(jql = %query.to_jql(), "Looking for existing update issues");

        let existing = tracker
            .search(&query)
            .await
            .map_err(ReconcileError::Query)?;

        match select_canonical(&existing) {
            None => create(event, tracker, config).await,
            Some(selection) => update(event, tracker, config, selection).await,
        }
    }
    .instrument(span)
    .await
}

async fn create(
    event: &ReleaseEvent,
    tracker: &dyn IssueTracker,
    config: &IssueConfig,
) -> Result<Outcome, ReconcileError> {
    let content = render_issue(event, config);

    if config.dry_run() {
        info!(
            summary = %content.summary,
            labels = ?content.labels,
            "[DRY RUN] Would create issue"
        );
        return Ok(Outcome::Created {
            issue: None,
            content,
            dry_run: true,
        });
    }

    let issue = tracker
        .create(&content)
        .await
        .map_err(ReconcileError::Create)?;
    info!(issue_id = %issue.id, issue_key = %issue.key, "Created issue");

    Ok(Outcome::Created {
        issue: Some(issue),
        content,
        dry_run: false,
    })
}

async fn update(
    event: &ReleaseEvent,
    tracker: &dyn IssueTracker,
    config: &IssueConfig,
    selection: Selection<'_>,
) -> Result<Outcome, ReconcileError> {
    let canonical = selection.canonical;
    let duplicates: Vec<IssueRef> = selection
        .duplicates
        .iter()
        .map(|issue| issue.to_ref())
        .collect();

    if !duplicates.is_empty() {
        let keys: Vec<&str> = duplicates.iter().map(|d| d.key.as_str()).collect();
        warn!(
            canonical = %canonical.key,
            duplicates = %keys.join(", "),
            "Ignoring possible duplicate issues in favor of older issue"
        );
    }

    let summary = generate_issue_summary(event);

    if config.dry_run() {
        info!(
            issue_key = %canonical.key,
            from = %canonical.summary,
            to = %summary,
            "[DRY RUN] Would update issue summary"
        );
    } else {
        tracker
            .update_summary(&canonical.id, &summary)
            .await
            .map_err(|e| ReconcileError::Update {
                key: canonical.key.clone(),
                source: e,
            })?;
        info!(
            issue_key = %canonical.key,
            from = %canonical.summary,
            to = %summary,
            "Updated issue summary"
        );
    }

    Ok(Outcome::Updated {
        issue: canonical.to_ref(),
        previous_summary: canonical.summary.clone(),
        summary,
        duplicates,
        dry_run: config.dry_run(),
    })
}
