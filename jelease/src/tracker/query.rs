//! Existing-issue queries.

use crate::config::IssueConfig;
use crate::release::ReleaseEvent;
use serde_json::Value;

/// How a project's issues are identified on the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectIdentity {
    /// Issues carry the project name as a label.
    Label(String),
    /// Issues carry the project name in a custom field.
    CustomField { id: u64, value: String },
}

/// Search for the open update issues of a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    status: String,
    identity: ProjectIdentity,
}

impl IssueQuery {
    /// Creates a query for issues in `status` matching `identity`.
    #[must_use]
    pub fn new(status: impl Into<String>, identity: ProjectIdentity) -> Self {
        Self {
            status: status.into(),
            identity,
        }
    }

    /// Builds the query for a release under the given configuration.
    ///
    /// A configured project custom field replaces the label condition.
    #[must_use]
    pub fn for_release(event: &ReleaseEvent, config: &IssueConfig) -> Self {
        let identity = match config.project_custom_field() {
            Some(id) => ProjectIdentity::CustomField {
                id,
                value: event.project().to_string(),
            },
            None => ProjectIdentity::Label(event.project().to_string()),
        };
        Self::new(config.default_status(), identity)
    }

    /// Status the issues must be in.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Project identity condition.
    #[must_use]
    pub fn identity(&self) -> &ProjectIdentity {
        &self.identity
    }

    /// Renders the query as JQL, oldest issues first.
    ///
    /// Text custom fields only support the `~` (contains) operator in JQL, so
    /// custom-field results also match projects whose name merely contains
    /// the value. Trackers must drop those (see [`IssueQuery::matches_field`]).
    #[must_use]
    pub fn to_jql(&self) -> String {
        let condition = match &self.identity {
            ProjectIdentity::Label(label) => format!("labels = {}", quote(label)),
            ProjectIdentity::CustomField { id, value } => {
                format!("cf[{id}] ~ {}", quote(value))
            }
        };
        format!(
            "status = {} AND {condition} ORDER BY created ASC",
            quote(&self.status)
        )
    }

    /// Returns whether a custom field value identifies the queried project
    /// exactly. Plain strings, select options (`{"value": ..}`) and
    /// multi-value arrays of either are understood.
    ///
    /// Label queries match exactly on the tracker side, so this is only
    /// meaningful for [`ProjectIdentity::CustomField`].
    #[must_use]
    pub fn matches_field(&self, field: &Value) -> bool {
        match &self.identity {
            ProjectIdentity::Label(_) => true,
            ProjectIdentity::CustomField { value, .. } => field_equals(field, value),
        }
    }
}

fn field_equals(field: &Value, expected: &str) -> bool {
    match field {
        Value::String(s) => s.trim() == expected,
        Value::Object(option) => option.get("value").is_some_and(|v| field_equals(v, expected)),
        Value::Array(values) => values.iter().any(|v| field_equals(v, expected)),
        _ => false,
    }
}

/// Quotes a JQL string literal.
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
