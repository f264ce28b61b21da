//! Update issue content and tracker issue types.
//!
//! [`render_issue`] turns a [`ReleaseEvent`] into the [`IssueContent`] of the
//! update issue that tracks it. It is a pure function of the event and the
//! [`IssueConfig`].

mod content;
mod existing;

pub use content::{IssueContent, ProjectField};
pub use existing::{ExistingIssue, IssueRef};

use crate::config::IssueConfig;
use crate::release::ReleaseEvent;
use crate::templates::generate_issue_summary;
use tracing::error;

/// Renders the content of the update issue for a release.
///
/// The description template was validated when configuration was loaded, so
/// rendering is not expected to fail. If it does, the error is logged and the
/// raw template source is used instead.
#[must_use]
pub fn render_issue(event: &ReleaseEvent, config: &IssueConfig) -> IssueContent {
    let description = match config.description().render(event) {
        Ok(description) => description,
        Err(e) => {
            error!(
                project = %event.project(),
                error = %e,
                "Failed to render issue description, using template source"
            );
            config.description().source().to_string()
        }
    };

    IssueContent {
        summary: generate_issue_summary(event),
        description,
        labels: merge_labels(config.labels(), event.project()),
        issue_type: config.issue_type().to_string(),
        status: config.default_status().to_string(),
        project_key: config.project_key().to_string(),
        project_field: config.project_custom_field().map(|id| ProjectField {
            id,
            value: event.project().to_string(),
        }),
    }
}

/// Appends the project to the configured labels.
///
/// Blank labels are dropped and duplicates removed, keeping first occurrence.
fn merge_labels(labels: &[String], project: &str) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(labels.len() + 1);
    for label in labels.iter().map(String::as_str).chain([project]) {
        let label = label.trim();
        if !label.is_empty() && !merged.iter().any(|l| l == label) {
            merged.push(label.to_string());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::DescriptionTemplate;

    fn sample_event() -> ReleaseEvent {
        ReleaseEvent::new("github", "widget", "2.0.0").unwrap()
    }

    #[test]
    fn renders_issue_for_release() {
        let config = IssueConfig::new("OPS", "To Do")
            .with_labels(vec!["dependencies".to_string(), "jelease".to_string()])
            .with_description(DescriptionTemplate::parse("{{project}}@{{version}}").unwrap());

        let content = render_issue(&sample_event(), &config);

        assert_eq!(content.summary, "Update widget to version 2.0.0");
        assert_eq!(content.description, "widget@2.0.0");
        assert_eq!(content.labels, ["dependencies", "jelease", "widget"]);
        assert_eq!(content.issue_type, "Task");
        assert_eq!(content.status, "To Do");
        assert_eq!(content.project_key, "OPS");
        assert_eq!(content.project_field, None);
    }

    #[test]
    fn sets_project_field_when_configured() {
        let config = IssueConfig::new("OPS", "To Do").with_project_custom_field(Some(10100));

        let content = render_issue(&sample_event(), &config);

        assert_eq!(
            content.project_field,
            Some(ProjectField {
                id: 10100,
                value: "widget".to_string()
            })
        );
        assert!(content.labels.contains(&"widget".to_string()));
    }

    #[test]
    fn can_merge_labels() {
        let labels = vec![
            "widget".to_string(),
            " ".to_string(),
            "deps".to_string(),
            "deps".to_string(),
        ];
        assert_eq!(merge_labels(&labels, "widget"), ["widget", "deps"]);
        assert_eq!(merge_labels(&[], "widget"), ["widget"]);
    }
}
