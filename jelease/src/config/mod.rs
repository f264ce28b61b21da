//! Service configuration.
//!
//! Configuration is assembled from layers ([`ConfigFile`]): a TOML file,
//! environment variables and command-line flags, highest precedence last.
//! The merged result is a [`Config`], which is immutable for the lifetime of
//! the process. The tracker project and default status are checked against
//! the tracker once at startup with [`validate_against_tracker`].

mod error;
mod file;

pub use error::ConfigError;
pub use file::ConfigFile;

use crate::templates::DescriptionTemplate;
use crate::tracker::IssueTracker;
use std::fmt;
use tracing::info;
use url::Url;

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Issue type used when none is configured.
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    port: u16,
    jira: JiraConfig,
    issues: IssueConfig,
    serialize_per_project: bool,
}

impl Config {
    /// Creates a configuration.
    #[must_use]
    pub fn new(port: u16, jira: JiraConfig, issues: IssueConfig) -> Self {
        Self {
            port,
            jira,
            issues,
            serialize_per_project: false,
        }
    }

    /// Enables or disables per-project serialization of webhook handling.
    #[must_use]
    pub fn with_serialize_per_project(mut self, serialize_per_project: bool) -> Self {
        self.serialize_per_project = serialize_per_project;
        self
    }

    /// Returns the port to listen on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the Jira connection settings.
    pub fn jira(&self) -> &JiraConfig {
        &self.jira
    }

    /// Returns the issue settings.
    pub fn issues(&self) -> &IssueConfig {
        &self.issues
    }

    /// Returns whether requests for the same project are handled one at a time.
    pub fn serialize_per_project(&self) -> bool {
        self.serialize_per_project
    }
}

/// Jira connection settings.
#[derive(Clone)]
pub struct JiraConfig {
    url: Url,
    user: String,
    token: String,
}

impl JiraConfig {
    /// Creates Jira connection settings.
    #[must_use]
    pub fn new(url: Url, user: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url,
            user: user.into(),
            token: token.into(),
        }
    }

    /// Returns the Jira base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the Jira user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the Jira API token.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("url", &self.url.as_str())
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Settings that shape the issues the reconciler searches for and creates.
#[derive(Debug, Clone)]
pub struct IssueConfig {
    project_key: String,
    default_status: String,
    labels: Vec<String>,
    issue_type: String,
    description: DescriptionTemplate,
    dry_run: bool,
    project_custom_field: Option<u64>,
}

impl IssueConfig {
    /// Creates issue settings with default labels, type and description.
    #[must_use]
    pub fn new(project_key: impl Into<String>, default_status: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            default_status: default_status.into(),
            labels: Vec::new(),
            issue_type: DEFAULT_ISSUE_TYPE.to_string(),
            description: DescriptionTemplate::default(),
            dry_run: false,
            project_custom_field: None,
        }
    }

    /// Sets the labels added to every created issue.
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the issue type of created issues.
    #[must_use]
    pub fn with_issue_type(mut self, issue_type: impl Into<String>) -> Self {
        self.issue_type = issue_type.into();
        self
    }

    /// Sets the description template.
    #[must_use]
    pub fn with_description(mut self, description: DescriptionTemplate) -> Self {
        self.description = description;
        self
    }

    /// Enables or disables dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Sets the custom field used to identify a project's issues.
    #[must_use]
    pub fn with_project_custom_field(mut self, field_id: Option<u64>) -> Self {
        self.project_custom_field = field_id;
        self
    }

    /// Returns the key of the project issues are filed in.
    pub fn project_key(&self) -> &str {
        &self.project_key
    }

    /// Returns the status issues are searched by and start in.
    pub fn default_status(&self) -> &str {
        &self.default_status
    }

    /// Returns the static labels.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the issue type.
    pub fn issue_type(&self) -> &str {
        &self.issue_type
    }

    /// Returns the description template.
    pub fn description(&self) -> &DescriptionTemplate {
        &self.description
    }

    /// Returns whether tracker mutations are suppressed.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the project custom field id, if issues are identified by one.
    pub fn project_custom_field(&self) -> Option<u64> {
        self.project_custom_field
    }
}

/// Checks that the configured project and default status exist on the tracker.
///
/// # Errors
///
/// Returns [`ConfigError::ProjectNotFound`] or [`ConfigError::StatusNotFound`]
/// if either is missing, or [`ConfigError::Tracker`] if the tracker can't be
/// queried.
pub async fn validate_against_tracker(
    config: &IssueConfig,
    tracker: &dyn IssueTracker,
) -> Result<(), ConfigError> {
    let projects = tracker
        .list_projects()
        .await
        .map_err(|e| ConfigError::Tracker {
            what: "project list",
            source: e,
        })?;
    if !projects.iter().any(|p| p.key == config.project_key) {
        return Err(ConfigError::ProjectNotFound {
            project: config.project_key.clone(),
        });
    }

    let statuses = tracker
        .list_statuses()
        .await
        .map_err(|e| ConfigError::Tracker {
            what: "status list",
            source: e,
        })?;
    if !statuses.iter().any(|s| s.name == config.default_status) {
        return Err(ConfigError::StatusNotFound {
            status: config.default_status.clone(),
        });
    }

    info!(
        project = %config.project_key,
        status = %config.default_status,
        "Validated Jira project and status"
    );
    Ok(())
}
