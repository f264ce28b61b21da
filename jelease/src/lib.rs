#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod issues;
pub mod reconcile;
pub mod release;
pub mod server;
pub mod templates;
pub mod tracker;
pub mod webhook;

pub use config::{validate_against_tracker, Config, ConfigError, ConfigFile, IssueConfig, JiraConfig};
pub use issues::{render_issue, ExistingIssue, IssueContent, IssueRef, ProjectField};
pub use reconcile::{reconcile, select_canonical, Outcome, ReconcileError, Selection};
pub use release::{DecodeError, ReleaseEvent};
pub use server::{Server, ServerError};
pub use templates::{generate_issue_summary, DescriptionTemplate, TemplateError};
pub use tracker::{
    IssueQuery, IssueTracker, JiraClient, ProjectIdentity, TrackerError, TrackerProject,
    TrackerStatus,
};
pub use webhook::{router, ProjectLocks, WebhookState};
