//! Layered configuration values.

use crate::config::{Config, ConfigError, IssueConfig, JiraConfig, DEFAULT_PORT};
use crate::templates::DescriptionTemplate;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;
use url::Url;

/// One layer of configuration, e.g. a TOML file or command-line flags.
///
/// Every option is optional here; [`ConfigFile::into_config`] checks that the
/// required ones are present once all layers are merged.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Port to listen on.
    pub port: Option<u16>,

    /// Base URL of the Jira server.
    pub jira_url: Option<String>,

    /// Jira user name or e-mail.
    pub jira_user: Option<String>,

    /// Jira API token or password.
    pub jira_token: Option<String>,

    /// Key of the Jira project issues are filed in.
    pub project: Option<String>,

    /// Status new issues start in and existing issues are searched by.
    pub default_status: Option<String>,

    /// Labels added to every created issue.
    pub add_labels: Option<Vec<String>>,

    /// Issue type of created issues.
    pub issue_type: Option<String>,

    /// Handlebars template for issue descriptions.
    pub description_template: Option<String>,

    /// Log intended actions instead of changing issues.
    pub dry_run: Option<bool>,

    /// Numeric id of a custom field holding the project name.
    pub project_custom_field: Option<u64>,

    /// Serialize webhook handling per project within this process.
    pub serialize_per_project: Option<bool>,
}

impl ConfigFile {
    /// Loads a configuration layer from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file can't be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!(path = %path.display(), "Loading config file");

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::TomlError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Overlays `overrides` on top of this layer; values set in `overrides` win.
    #[must_use]
    pub fn merge(self, overrides: Self) -> Self {
        Self {
            port: overrides.port.or(self.port),
            jira_url: overrides.jira_url.or(self.jira_url),
            jira_user: overrides.jira_user.or(self.jira_user),
            jira_token: overrides.jira_token.or(self.jira_token),
            project: overrides.project.or(self.project),
            default_status: overrides.default_status.or(self.default_status),
            add_labels: overrides.add_labels.or(self.add_labels),
            issue_type: overrides.issue_type.or(self.issue_type),
            description_template: overrides.description_template.or(self.description_template),
            dry_run: overrides.dry_run.or(self.dry_run),
            project_custom_field: overrides.project_custom_field.or(self.project_custom_field),
            serialize_per_project: overrides.serialize_per_project.or(self.serialize_per_project),
        }
    }

    /// Validates the merged layers and builds the final configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required option is missing, the Jira URL
    /// is invalid, or the description template does not render.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let jira_url = required(self.jira_url, "jira-url")?;
        let url = Url::parse(&jira_url).map_err(|e| ConfigError::InvalidUrl {
            value: jira_url.clone(),
            source: e,
        })?;
        let jira = JiraConfig::new(
            url,
            required(self.jira_user, "jira-user")?,
            required(self.jira_token, "jira-token")?,
        );

        let mut issues = IssueConfig::new(
            required(self.project, "project")?,
            required(self.default_status, "default-status")?,
        )
        .with_labels(self.add_labels.unwrap_or_default())
        .with_dry_run(self.dry_run.unwrap_or(false))
        .with_project_custom_field(self.project_custom_field);
        if let Some(issue_type) = self.issue_type.filter(|t| !t.trim().is_empty()) {
            issues = issues.with_issue_type(issue_type);
        }
        if let Some(template) = self.description_template {
            issues = issues.with_description(DescriptionTemplate::parse(template)?);
        }

        Ok(Config::new(self.port.unwrap_or(DEFAULT_PORT), jira, issues)
            .with_serialize_per_project(self.serialize_per_project.unwrap_or(false)))
    }
}

fn required(value: Option<String>, option: &'static str) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingOption { option })
}
