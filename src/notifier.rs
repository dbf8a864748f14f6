//! Per-dependency release check lifecycle
//!
//! A `ReleaseNotifier` owns one dependency's check for one scan pass:
//! resolve the probe, run discovery inside a private scratch directory,
//! and expose what the scanner needs (was a new version detected, the
//! candidate snapshot to commit, the composed notification body). It
//! never persists and never delivers; both stay with the scanner so a
//! delivery failure cannot corrupt check state.

use crate::domain::{ProbeParams, ReferenceSnapshot};
use crate::error::ProbeError;
use crate::probe::{self, ProbeContext, VersionProbe};
use crate::remote::{GithubClient, HttpClient};
use tracing::{debug, info};

/// Title prefix for every notification
pub const ISSUE_TITLE_BASE: &str = "Upstream release of dependency: ";

/// Captured result of a check that found a new release
#[derive(Debug, Clone)]
pub struct NewRelease {
    /// Version identifier the probe discovered
    pub version: String,
    /// Snapshot to commit once every delivery succeeded
    pub candidate: ReferenceSnapshot,
    /// Composed notification body (banner + probe detail)
    pub body: String,
}

enum CheckState {
    Idle,
    NoChange,
    NewVersion(NewRelease),
}

/// One dependency's check, alive for a single scan pass
pub struct ReleaseNotifier {
    dependency: String,
    params: ProbeParams,
    reference: ReferenceSnapshot,
    state: CheckState,
}

impl ReleaseNotifier {
    /// Create a notifier in the idle state
    pub fn new(
        dependency: impl Into<String>,
        params: ProbeParams,
        reference: ReferenceSnapshot,
    ) -> Self {
        Self {
            dependency: dependency.into(),
            params,
            reference,
            state: CheckState::Idle,
        }
    }

    /// Dependency identifier this notifier owns
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Notification title for this dependency
    pub fn title(&self) -> String {
        format!("{}{}", ISSUE_TITLE_BASE, self.dependency)
    }

    /// Run the check to completion.
    ///
    /// The probe is constructed inside a fresh temporary directory that
    /// is removed on every exit path, so downloaded artifacts cannot
    /// collide across dependencies or leak into the process working
    /// directory. An upstream with no qualifying release is recorded as
    /// "no change", not as a failure.
    pub async fn check(
        &mut self,
        github: &GithubClient,
        http: &HttpClient,
    ) -> Result<(), ProbeError> {
        let workdir = tempfile::tempdir().map_err(|e| {
            ProbeError::init_failed(&self.dependency, format!("failed to create workdir: {}", e))
        })?;

        let ctx = ProbeContext {
            dependency: &self.dependency,
            params: &self.params,
            reference: &self.reference,
            github,
            http,
            workdir: workdir.path(),
        };

        match probe::build_probe(&ctx).await {
            Ok(probe) => {
                self.evaluate(probe.as_ref());
                Ok(())
            }
            Err(ProbeError::NoReleaseFound { dependency }) => {
                debug!(dependency = %dependency, "no qualifying release upstream");
                self.state = CheckState::NoChange;
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Interpret a constructed probe's verdict. The candidate snapshot
    /// and the extra detail are captured eagerly, before any persistence
    /// or delivery can fail.
    fn evaluate(&mut self, probe: &dyn VersionProbe) {
        if !probe.has_new_version() {
            debug!(dependency = %self.dependency, "no new version detected");
            self.state = CheckState::NoChange;
            return;
        }

        let candidate = probe.next_reference();
        let detail = probe.extra_detail();
        let version = candidate.version().unwrap_or_default().to_string();
        info!(dependency = %self.dependency, %version, "new version detected");

        let body = format!("{}{}", comment_banner(&self.dependency), detail);
        self.state = CheckState::NewVersion(NewRelease {
            version,
            candidate,
            body,
        });
    }

    /// Did this pass's check find a new version?
    pub fn new_version_detected(&self) -> bool {
        matches!(self.state, CheckState::NewVersion(_))
    }

    /// The detected release, when one was found
    pub fn release(&self) -> Option<&NewRelease> {
        match &self.state {
            CheckState::NewVersion(release) => Some(release),
            _ => None,
        }
    }
}

/// Fixed boilerplate opening every notification body
fn comment_banner(dependency: &str) -> String {
    format!(
        "This is a message from an automated system that monitors `{}` releases.\n\n",
        dependency
    )
}
