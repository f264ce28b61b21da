//! Service bootstrap.

mod error;

pub use error::ServerError;

use crate::config::{validate_against_tracker, Config};
use crate::tracker::{IssueTracker, JiraClient};
use crate::webhook::{router, ProjectLocks, WebhookState};
use axum::Router;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Validates configuration against the tracker and serves webhooks.
pub struct Server {
    config: Config,
    tracker: Arc<dyn IssueTracker>,
}

impl Server {
    /// Builds a server talking to the configured Jira instance.
    pub fn new(config: Config) -> Result<Self, ServerError> {
        info!(url = %config.jira().url(), "Using Jira server");
        let tracker = JiraClient::new(config.jira())?;
        Ok(Self::with_tracker(config, Arc::new(tracker)))
    }

    /// Builds a server on top of an existing tracker client.
    pub fn with_tracker(config: Config, tracker: Arc<dyn IssueTracker>) -> Self {
        Self { config, tracker }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds the HTTP router for this server.
    pub fn router(&self) -> Router {
        let mut state = WebhookState::new(Arc::clone(&self.tracker), self.config.issues().clone());
        if self.config.serialize_per_project() {
            state = state.with_project_locks(Arc::new(ProjectLocks::new()));
        }
        router(state)
    }

    /// Validates configuration, then serves until Ctrl-C or SIGTERM.
    ///
    /// Nothing is served if validation fails.
    pub async fn run(&self) -> Result<(), ServerError> {
        validate_against_tracker(self.config.issues(), self.tracker.as_ref()).await?;

        if self.config.issues().dry_run() {
            warn!("Dry run enabled, no issues will be created or updated");
        }

        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.config.port()));
        let listener = TcpListener::bind(addr).await?;
        info!(addr = %listener.local_addr()?, "Listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server closed");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down");
}
