//! Notification delivery sinks
//!
//! A sink accepts a target repository, a title and a body and reports
//! success or failure. Delivery failure never touches notifier or store
//! state; the scanner decides what to do with it.

use crate::error::NotifyError;
use crate::remote::GithubClient;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Abstraction over posting a notification to a named destination
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification to `target` (`owner/repo`)
    async fn deliver(&self, target: &str, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Posts notifications as issues on the target repository
pub struct GithubIssueSink {
    github: Arc<GithubClient>,
}

impl GithubIssueSink {
    /// Create a sink posting through the shared client
    pub fn new(github: Arc<GithubClient>) -> Self {
        Self { github }
    }
}

#[async_trait]
impl NotificationSink for GithubIssueSink {
    async fn deliver(&self, target: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        info!(%target, %title, "posting issue");
        self.github
            .create_issue(target, title, body)
            .await
            .map_err(|e| NotifyError::delivery_failed(target, e.to_string()))
    }
}

/// Dry-run sink: renders the notification on the local console instead
/// of performing remote delivery. Reference bookkeeping is unaffected;
/// callers wanting a fully side-effect-free pass must also suppress
/// persistence.
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn deliver(&self, target: &str, title: &str, body: &str) -> Result<(), NotifyError> {
        println!("--- notification for {} (dry-run) ---", target);
        println!("{}", title);
        println!();
        println!("{}", body);
        println!("---");
        Ok(())
    }
}
