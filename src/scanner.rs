//! Scan orchestrator
//!
//! Drives one full pass: fetch each repository's dependency config,
//! collapse the requests to distinct dependencies, run one release check
//! per dependency, deliver notifications to every requesting repository,
//! and persist the reference store once at the end. Any single
//! repository or dependency failing is logged and skipped; the pass
//! always makes forward progress on the rest.

use crate::config::{self, ConfigSource};
use crate::domain::{DeliveryRecord, DepOutcome, DepStatus, DependencyRequest, ScanReport};
use crate::error::RemoteError;
use crate::notifier::ReleaseNotifier;
use crate::notify::NotificationSink;
use crate::progress::ScanProgress;
use crate::remote::{GithubClient, HttpClient};
use crate::store::ReferenceStore;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Pass-level behavior switches
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Deliveries are rendered locally instead of posted
    pub dry_run: bool,
    /// Whether to rewrite the reference store at pass end
    pub persist: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            persist: true,
        }
    }
}

/// Orchestrator for one scan pass
pub struct Scanner {
    store: ReferenceStore,
    github: Arc<GithubClient>,
    http: HttpClient,
    config_source: Box<dyn ConfigSource>,
    sink: Box<dyn NotificationSink>,
    options: ScanOptions,
}

impl Scanner {
    /// Create a scanner. The GitHub client is shared by reference with
    /// every probe and sink that needs it; it is never re-authenticated
    /// per dependency.
    pub fn new(
        store: ReferenceStore,
        github: Arc<GithubClient>,
        config_source: Box<dyn ConfigSource>,
        sink: Box<dyn NotificationSink>,
        options: ScanOptions,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            store,
            github,
            http: HttpClient::new()?,
            config_source,
            sink,
            options,
        })
    }

    /// Reference store as mutated by the passes run so far
    pub fn store(&self) -> &ReferenceStore {
        &self.store
    }

    /// Run one full scan pass over the given repositories
    pub async fn run(&mut self, repos: &[String], progress: &ScanProgress) -> ScanReport {
        let mut report = ScanReport::new(self.options.dry_run);

        let requests = self.gather_requests(repos, progress, &mut report).await;

        // Collapse to distinct dependencies: several repositories may
        // track the same upstream, but it gets exactly one check per
        // pass. BTreeMap keeps the order stable across runs.
        let mut by_dependency: BTreeMap<String, Vec<&DependencyRequest>> = BTreeMap::new();
        for request in &requests {
            by_dependency
                .entry(request.dependency.clone())
                .or_default()
                .push(request);
        }
        info!(
            repositories = repos.len(),
            requests = requests.len(),
            dependencies = by_dependency.len(),
            "scan pass starting"
        );

        for (dependency, requesters) in &by_dependency {
            progress.message(format!("Checking {}", dependency));
            let outcome = self.check_one(dependency, requesters, &mut report).await;
            report.outcomes.push(outcome);
        }

        if self.options.persist {
            progress.message("Persisting references");
            if let Err(e) = self.store.persist() {
                error!(error = %e, "failed to persist reference store");
                report.errors.push(e.to_string());
            }
        } else {
            info!("reference store persistence suppressed");
        }

        report.generated_at = Utc::now();
        report
    }

    /// Fetch and parse every repository's config; failures yield zero
    /// requests for that repository and the scan continues
    async fn gather_requests(
        &self,
        repos: &[String],
        progress: &ScanProgress,
        report: &mut ScanReport,
    ) -> Vec<DependencyRequest> {
        let mut requests = Vec::new();
        for repo in repos {
            progress.message(format!("Scanning {}", repo));
            let raw = match self.config_source.fetch(repo).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(%repo, error = %e, "dependency config unavailable, skipping repository");
                    report.errors.push(e.to_string());
                    continue;
                }
            };
            match config::parse_repo_config(repo, &raw) {
                Ok(mut parsed) => {
                    info!(%repo, dependencies = parsed.len(), "dependency config loaded");
                    requests.append(&mut parsed);
                }
                Err(e) => {
                    warn!(%repo, error = %e, "dependency config invalid, skipping repository");
                    report.errors.push(e.to_string());
                }
            }
        }
        requests
    }

    /// Check one distinct dependency and deliver to its requesters
    async fn check_one(
        &mut self,
        dependency: &str,
        requesters: &[&DependencyRequest],
        report: &mut ScanReport,
    ) -> DepOutcome {
        // The first requester's parameters drive the check, as with the
        // notifier instance itself
        let params = requesters[0].params.clone();
        let reference = self.store.get(dependency);
        let mut notifier = ReleaseNotifier::new(dependency, params, reference);

        if let Err(e) = notifier.check(&self.github, &self.http).await {
            error!(%dependency, error = %e, "release check failed");
            report.errors.push(e.to_string());
            return DepOutcome::new(
                dependency,
                DepStatus::CheckFailed {
                    reason: e.to_string(),
                },
            );
        }

        let Some(release) = notifier.release() else {
            return DepOutcome::new(dependency, DepStatus::UpToDate);
        };

        let title = notifier.title();
        let mut deliveries = Vec::new();
        for request in requesters {
            match self.sink.deliver(&request.repo, &title, &release.body).await {
                Ok(()) => deliveries.push(DeliveryRecord::delivered(&request.repo)),
                Err(e) => {
                    warn!(%dependency, repo = %request.repo, error = %e, "notification delivery failed");
                    report.errors.push(e.to_string());
                    deliveries.push(DeliveryRecord::failed(&request.repo, e.to_string()));
                }
            }
        }

        if deliveries.iter().all(|d| d.delivered) {
            // Delivery confirmed everywhere: commit the candidate so the
            // next pass sees this release as known
            self.store
                .set(dependency.to_string(), release.candidate.clone());
            DepOutcome::with_deliveries(
                dependency,
                DepStatus::Notified {
                    version: release.version.clone(),
                },
                deliveries,
            )
        } else {
            // Old reference retained: the release will be re-detected and
            // delivery retried on the next pass
            DepOutcome::with_deliveries(
                dependency,
                DepStatus::NotifyFailed {
                    version: release.version.clone(),
                },
                deliveries,
            )
        }
    }
}
