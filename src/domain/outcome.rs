//! Per-dependency scan outcomes and the pass-level report

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Final state of one dependency after a scan pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DepStatus {
    /// No version change detected, reference untouched
    UpToDate,
    /// New release detected and every requesting repository notified
    Notified { version: String },
    /// New release detected but at least one delivery failed; the old
    /// reference is retained so the release is re-detected next pass
    NotifyFailed { version: String },
    /// The check itself failed (plugin resolution, probe construction)
    CheckFailed { reason: String },
}

impl fmt::Display for DepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DepStatus::UpToDate => write!(f, "up-to-date"),
            DepStatus::Notified { version } => write!(f, "new release {} notified", version),
            DepStatus::NotifyFailed { version } => {
                write!(f, "new release {} detected, notification failed", version)
            }
            DepStatus::CheckFailed { reason } => write!(f, "check failed: {}", reason),
        }
    }
}

/// Result of one delivery attempt to one requesting repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Repository the notification was addressed to
    pub repo: String,
    /// Whether the sink reported success
    pub delivered: bool,
    /// Delivery error, when it failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryRecord {
    /// Records a successful delivery
    pub fn delivered(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            delivered: true,
            error: None,
        }
    }

    /// Records a failed delivery
    pub fn failed(repo: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            delivered: false,
            error: Some(error.into()),
        }
    }
}

/// Outcome of one distinct dependency within a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepOutcome {
    /// Dependency identifier
    pub dependency: String,
    #[serde(flatten)]
    pub status: DepStatus,
    /// One record per requesting repository, empty unless a release was
    /// detected
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub deliveries: Vec<DeliveryRecord>,
}

impl DepOutcome {
    /// Creates an outcome with no deliveries
    pub fn new(dependency: impl Into<String>, status: DepStatus) -> Self {
        Self {
            dependency: dependency.into(),
            status,
            deliveries: Vec::new(),
        }
    }

    /// Creates an outcome carrying delivery records
    pub fn with_deliveries(
        dependency: impl Into<String>,
        status: DepStatus,
        deliveries: Vec<DeliveryRecord>,
    ) -> Self {
        Self {
            dependency: dependency.into(),
            status,
            deliveries,
        }
    }
}

/// Report for one complete scan pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// Whether deliveries were rendered locally instead of posted
    pub dry_run: bool,
    /// When the pass finished
    pub generated_at: DateTime<Utc>,
    /// Outcome per distinct dependency, in identifier order
    pub outcomes: Vec<DepOutcome>,
    /// Non-fatal errors collected along the way (config fetches, probe
    /// failures), already logged but kept for the report
    pub errors: Vec<String>,
}

impl ScanReport {
    /// Creates an empty report
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            generated_at: Utc::now(),
            outcomes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Number of dependencies whose releases were fully notified
    pub fn notified_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DepStatus::Notified { .. }))
            .count()
    }

    /// Number of dependencies that are up to date
    pub fn up_to_date_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, DepStatus::UpToDate))
            .count()
    }

    /// Number of dependencies that failed to check or notify
    pub fn failed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    DepStatus::NotifyFailed { .. } | DepStatus::CheckFailed { .. }
                )
            })
            .count()
    }

    /// True when any dependency failed or any non-fatal error was recorded
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0 || !self.errors.is_empty()
    }
}
