//! In-memory issue tracker for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset};
use jelease::{
    ExistingIssue, IssueContent, IssueQuery, IssueRef, IssueTracker, ProjectIdentity,
    TrackerError, TrackerProject, TrackerStatus,
};
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// A tracker call, as recorded by [`FakeTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Create(IssueContent),
    Update { id: String, summary: String },
    ListProjects,
    ListStatuses,
}

/// Which call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Search,
    Create,
    Update,
    ListProjects,
}

#[derive(Debug, Clone)]
struct StoredIssue {
    issue: ExistingIssue,
    status: String,
    labels: Vec<String>,
    custom_field: Option<(u64, String)>,
}

/// Issue tracker holding issues in memory and recording every call.
#[derive(Debug)]
pub struct FakeTracker {
    issues: Mutex<Vec<StoredIssue>>,
    calls: Mutex<Vec<Call>>,
    fail_on: Option<FailOn>,
    next_id: Mutex<u64>,
    projects: Vec<String>,
    statuses: Vec<String>,
    search_delay: Option<StdDuration>,
}

impl Default for FakeTracker {
    fn default() -> Self {
        Self {
            issues: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_on: None,
            next_id: Mutex::new(100),
            projects: vec!["OPS".to_string()],
            statuses: vec!["To Do".to_string(), "Done".to_string()],
            search_delay: None,
        }
    }
}

pub fn timestamp(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap()
}

impl FakeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(fail_on: FailOn) -> Self {
        Self {
            fail_on: Some(fail_on),
            ..Self::default()
        }
    }

    /// Makes every search take `delay`, widening the query-then-act window.
    pub fn with_search_delay(mut self, delay: StdDuration) -> Self {
        self.search_delay = Some(delay);
        self
    }

    pub fn with_projects(mut self, projects: &[&str]) -> Self {
        self.projects = projects.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_statuses(mut self, statuses: &[&str]) -> Self {
        self.statuses = statuses.iter().map(ToString::to_string).collect();
        self
    }

    /// Adds an issue labelled `project` in `status`.
    pub fn with_issue(
        self,
        id: &str,
        project: &str,
        status: &str,
        created_at: &str,
        summary: &str,
    ) -> Self {
        self.issues.lock().unwrap().push(StoredIssue {
            issue: ExistingIssue {
                id: id.to_string(),
                key: format!("OPS-{id}"),
                created_at: timestamp(created_at),
                summary: summary.to_string(),
            },
            status: status.to_string(),
            labels: vec![project.to_string()],
            custom_field: None,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn creates(&self) -> Vec<IssueContent> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(content) => Some(content),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { id, summary } => Some((id, summary)),
                _ => None,
            })
            .collect()
    }

    pub fn searches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Search(_)))
            .count()
    }

    pub fn summary_of(&self, id: &str) -> Option<String> {
        self.issues
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.issue.id == id)
            .map(|s| s.issue.summary.clone())
    }

    pub fn issue_count(&self) -> usize {
        self.issues.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail(&self, on: FailOn) -> Result<(), TrackerError> {
        if self.fail_on == Some(on) {
            return Err(TrackerError::Api {
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn search(&self, query: &IssueQuery) -> Result<Vec<ExistingIssue>, TrackerError> {
        self.record(Call::Search(query.to_jql()));
        self.fail(FailOn::Search)?;

        // Results are fixed when the query runs; the delay models the response
        // travelling back while other requests act on the tracker.
        let results: Vec<ExistingIssue> = self
            .issues
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.status == query.status())
            .filter(|s| match query.identity() {
                ProjectIdentity::Label(label) => s.labels.contains(label),
                ProjectIdentity::CustomField { id, value } => {
                    s.custom_field.as_ref() == Some(&(*id, value.clone()))
                }
            })
            .map(|s| s.issue.clone())
            .collect();

        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(results)
    }

    async fn create(&self, content: &IssueContent) -> Result<IssueRef, TrackerError> {
        self.record(Call::Create(content.clone()));
        self.fail(FailOn::Create)?;

        let id = {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            *next_id
        };
        let created_at = timestamp("2024-06-01T00:00:00Z") + Duration::seconds(id as i64);
        let issue = ExistingIssue {
            id: id.to_string(),
            key: format!("OPS-{id}"),
            created_at,
            summary: content.summary.clone(),
        };
        let issue_ref = issue.to_ref();
        self.issues.lock().unwrap().push(StoredIssue {
            issue,
            status: content.status.clone(),
            labels: content.labels.clone(),
            custom_field: content
                .project_field
                .as_ref()
                .map(|f| (f.id, f.value.clone())),
        });
        Ok(issue_ref)
    }

    async fn update_summary(&self, issue_id: &str, summary: &str) -> Result<(), TrackerError> {
        self.record(Call::Update {
            id: issue_id.to_string(),
            summary: summary.to_string(),
        });
        self.fail(FailOn::Update)?;

        let mut issues = self.issues.lock().unwrap();
        match issues.iter_mut().find(|s| s.issue.id == issue_id) {
            Some(stored) => {
                stored.issue.summary = summary.to_string();
                Ok(())
            }
            None => Err(TrackerError::Api {
                status: 404,
                body: format!("Issue {issue_id} does not exist"),
            }),
        }
    }

    async fn list_projects(&self) -> Result<Vec<TrackerProject>, TrackerError> {
        self.record(Call::ListProjects);
        self.fail(FailOn::ListProjects)?;

        Ok(self
            .projects
            .iter()
            .enumerate()
            .map(|(i, key)| TrackerProject {
                id: (10000 + i).to_string(),
                key: key.clone(),
                name: key.clone(),
            })
            .collect())
    }

    async fn list_statuses(&self) -> Result<Vec<TrackerStatus>, TrackerError> {
        self.record(Call::ListStatuses);

        Ok(self
            .statuses
            .iter()
            .enumerate()
            .map(|(i, name)| TrackerStatus {
                id: i.to_string(),
                name: name.clone(),
            })
            .collect())
    }
}
