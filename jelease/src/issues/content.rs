//! Rendered issue content.

/// Custom field carrying the project name when labels are not used for dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectField {
    /// Numeric custom field id, as in `customfield_<id>`.
    pub id: u64,
    /// Field value (the project name).
    pub value: String,
}

/// Content of an update issue, derived from a release and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueContent {
    /// Issue summary (title).
    pub summary: String,

    /// Rendered description.
    pub description: String,

    /// Labels, configured labels first and the project last.
    pub labels: Vec<String>,

    /// Issue type name, e.g. "Task".
    pub issue_type: String,

    /// Status the issue is expected to start in.
    pub status: String,

    /// Key of the tracker project the issue is filed in.
    pub project_key: String,

    /// Project identity field, if configured.
    pub project_field: Option<ProjectField>,
}
