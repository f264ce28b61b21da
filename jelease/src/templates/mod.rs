//! Issue text generation.
//!
//! Summaries have a fixed format so that a project's update issue can be
//! recognised and refreshed. Descriptions come from a configurable Handlebars
//! template that is validated once when configuration is loaded.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, DescriptionTemplate};

use crate::release::ReleaseEvent;

/// Description template used when none is configured.
pub const DEFAULT_DESCRIPTION_TEMPLATE: &str =
    "Update issue for {{project}} {{version}} generated by jelease from a {{provider}} release notification.";

/// Generates the issue summary for a release.
///
/// Format: "Update {project} to version {version}"
#[must_use]
pub fn generate_issue_summary(event: &ReleaseEvent) -> String {
    format!(
        "Update {} to version {}",
        event.project(),
        event.version()
    )
}
