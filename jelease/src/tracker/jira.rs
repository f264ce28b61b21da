//! Jira REST API (v2) client.

use super::{
    IssueQuery, IssueTracker, ProjectIdentity, TrackerError, TrackerProject, TrackerStatus,
};
use crate::config::JiraConfig;
use crate::issues::{ExistingIssue, IssueContent, IssueRef};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{header::ACCEPT, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound on issues returned by one search. A project should have one
/// open update issue; anything beyond a handful is already a data problem.
const MAX_SEARCH_RESULTS: &str = "100";

/// Issue tracker backed by a Jira server, authenticated with basic auth.
pub struct JiraClient {
    http: Client,
    base_url: Url,
    user: String,
    token: String,
}

impl JiraClient {
    /// Creates a client for the configured Jira server.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &JiraConfig) -> Result<Self, TrackerError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("jelease/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Url::join replaces the last path segment unless the base ends in '/'.
        let mut base_url = config.url().clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http,
            base_url,
            user: config.user().to_string(),
            token: config.token().to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, TrackerError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .basic_auth(&self.user, Some(&self.token))
            .header(ACCEPT, "application/json")
    }

    /// Turns non-success responses into [`TrackerError::Api`], keeping the body.
    async fn check_status(response: Response) -> Result<Response, TrackerError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unable to read response: {e}>"));
        Err(TrackerError::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TrackerError> {
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| TrackerError::Decode(e.to_string()))
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn search(&self, query: &IssueQuery) -> Result<Vec<ExistingIssue>, TrackerError> {
        let jql = query.to_jql();
        debug!(jql = %jql, "Searching Jira issues");

        let custom_field = match query.identity() {
            ProjectIdentity::CustomField { id, .. } => Some(format!("customfield_{id}")),
            ProjectIdentity::Label(_) => None,
        };
        let fields = match &custom_field {
            Some(name) => format!("summary,created,{name}"),
            None => "summary,created".to_string(),
        };

        let request = self.http.get(self.endpoint("rest/api/2/search")?).query(&[
            ("jql", jql.as_str()),
            ("fields", fields.as_str()),
            ("maxResults", MAX_SEARCH_RESULTS),
        ]);
        let response = self.authorized(request).send().await?;
        let payload: SearchResponse = Self::read_json(response).await?;

        // `~` on a text field is a contains match; keep exact matches only.
        let issues = payload.issues.into_iter().filter(|issue| {
            let Some(name) = &custom_field else {
                return true;
            };
            let value = issue.fields.extra.get(name);
            let matches = value.is_some_and(|v| query.matches_field(v));
            if !matches {
                debug!(
                    key = %issue.key,
                    field = %name,
                    value = ?value,
                    "Skipping issue of another project"
                );
            }
            matches
        });

        issues.map(ExistingIssue::try_from).collect()
    }

    async fn create(&self, content: &IssueContent) -> Result<IssueRef, TrackerError> {
        // Status is not settable on creation; the workflow assigns it.
        let mut fields = json!({
            "project": { "key": content.project_key },
            "summary": content.summary,
            "description": content.description,
            "issuetype": { "name": content.issue_type },
            "labels": content.labels,
        });
        if let Some(field) = &content.project_field {
            fields[format!("customfield_{}", field.id).as_str()] = json!(field.value);
        }

        let request = self
            .http
            .post(self.endpoint("rest/api/2/issue")?)
            .json(&json!({ "fields": fields }));
        let response = self.authorized(request).send().await?;
        let created: CreatedIssue = Self::read_json(response).await?;

        Ok(IssueRef {
            id: created.id,
            key: created.key,
        })
    }

    async fn update_summary(&self, issue_id: &str, summary: &str) -> Result<(), TrackerError> {
        let body = json!({
            "update": {
                "summary": [{ "set": summary }]
            }
        });
        let request = self
            .http
            .put(self.endpoint(&format!("rest/api/2/issue/{issue_id}"))?)
            .json(&body);
        let response = self.authorized(request).send().await?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn list_projects(&self) -> Result<Vec<TrackerProject>, TrackerError> {
        let request = self.http.get(self.endpoint("rest/api/2/project")?);
        let response = self.authorized(request).send().await?;
        let projects: Vec<ProjectEntry> = Self::read_json(response).await?;

        Ok(projects
            .into_iter()
            .map(|p| TrackerProject {
                id: p.id,
                key: p.key,
                name: p.name,
            })
            .collect())
    }

    async fn list_statuses(&self) -> Result<Vec<TrackerStatus>, TrackerError> {
        let request = self.http.get(self.endpoint("rest/api/2/status")?);
        let response = self.authorized(request).send().await?;
        let statuses: Vec<StatusEntry> = Self::read_json(response).await?;

        Ok(statuses
            .into_iter()
            .map(|s| TrackerStatus {
                id: s.id,
                name: s.name,
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<SearchIssue>,
}

#[derive(Deserialize)]
struct SearchIssue {
    id: String,
    key: String,
    fields: SearchIssueFields,
}

#[derive(Deserialize)]
struct SearchIssueFields {
    #[serde(default)]
    summary: String,
    created: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<SearchIssue> for ExistingIssue {
    type Error = TrackerError;

    fn try_from(issue: SearchIssue) -> Result<Self, Self::Error> {
        let created_at = parse_jira_timestamp(&issue.fields.created).map_err(|e| {
            TrackerError::Decode(format!(
                "issue {} has invalid creation time '{}': {e}",
                issue.key, issue.fields.created
            ))
        })?;
        Ok(Self {
            id: issue.id,
            key: issue.key,
            created_at,
            summary: issue.fields.summary,
        })
    }
}

#[derive(Deserialize)]
struct CreatedIssue {
    id: String,
    key: String,
}

#[derive(Deserialize)]
struct ProjectEntry {
    id: String,
    key: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct StatusEntry {
    id: String,
    name: String,
}

/// Parses Jira's `2024-01-02T03:04:05.000+0000` timestamps, or RFC 3339.
fn parse_jira_timestamp(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
}
