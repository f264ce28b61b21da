//! HTTP surface of the service.
//!
//! - `POST /webhook` takes a newreleases.io notification and reconciles it
//! - `GET /` (and any unmatched path) is a static health check
//!
//! Tracker failures are answered with a bare `500`; the details are only
//! logged.

mod locks;

pub use locks::ProjectLocks;

use crate::config::IssueConfig;
use crate::reconcile::reconcile;
use crate::release::ReleaseEvent;
use crate::tracker::IssueTracker;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared state of the webhook handlers.
#[derive(Clone)]
pub struct WebhookState {
    tracker: Arc<dyn IssueTracker>,
    issues: Arc<IssueConfig>,
    locks: Option<Arc<ProjectLocks>>,
}

impl WebhookState {
    /// Creates handler state without per-project serialization.
    #[must_use]
    pub fn new(tracker: Arc<dyn IssueTracker>, issues: IssueConfig) -> Self {
        Self {
            tracker,
            issues: Arc::new(issues),
            locks: None,
        }
    }

    /// Serializes reconciliation of the same project within this process.
    #[must_use]
    pub fn with_project_locks(mut self, locks: Arc<ProjectLocks>) -> Self {
        self.locks = Some(locks);
        self
    }
}

/// Builds the service router.
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(handle_webhook).fallback(reject_method))
        .route("/", any(handle_health))
        .fallback(handle_health)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_health() -> &'static str {
    info!("Received health check request");
    "Ok"
}

async fn reject_method(method: Method) -> Response {
    warn!(method = %method, "Rejected webhook request with wrong method");
    status_response(StatusCode::METHOD_NOT_ALLOWED)
}

async fn handle_webhook(State(state): State<WebhookState>, body: Bytes) -> Response {
    let event = match ReleaseEvent::from_json(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(
                error = %e,
                body = %String::from_utf8_lossy(&body),
                "Rejected malformed webhook payload"
            );
            return status_response(StatusCode::BAD_REQUEST);
        }
    };

    let _guard = match &state.locks {
        Some(locks) => Some(locks.acquire(event.project()).await),
        None => None,
    };

    match reconcile(&event, state.tracker.as_ref(), &state.issues).await {
        Ok(outcome) => {
            info!(
                project = %event.project(),
                outcome = outcome.as_str(),
                issue_key = outcome.issue_key().unwrap_or("-"),
                dry_run = outcome.is_dry_run(),
                "Handled release"
            );
            StatusCode::OK.into_response()
        }
        Err(e) => {
            error!(project = %event.project(), error = %e, "Failed to reconcile release");
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Responds with the status and its reason phrase only.
fn status_response(status: StatusCode) -> Response {
    (status, status.canonical_reason().unwrap_or_default()).into_response()
}
