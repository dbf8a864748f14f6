//! GitHub version probe
//!
//! Handles every `owner/repo` dependency through the shared authenticated
//! client. Two release styles:
//! - `github`: the latest published release object's tag, verbatim,
//!   stripped of one leading `v`
//! - `tag-only`: repository tags scanned, release-like names filtered
//!   and the highest version wins

use crate::domain::ReferenceSnapshot;
use crate::error::{ProbeError, RemoteError};
use crate::probe::{bounded_excerpt, ProbeContext, VersionProbe, EXCERPT_MAX_LINES};
use crate::remote::Tag;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Tags that look like releases: `1.2`, `v4.3.1`, `2.0.0.1`
static RELEASE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?\d+(\.\d+)+$").unwrap());

/// Probe for dependencies hosted on GitHub
#[derive(Debug)]
pub struct GithubProbe {
    reference: ReferenceSnapshot,
    next: ReferenceSnapshot,
    version: String,
    detail: String,
}

impl GithubProbe {
    /// Query the repository and capture the discovered version
    pub async fn discover(ctx: &ProbeContext<'_>) -> Result<Self, ProbeError> {
        let (owner, repo) = split_identifier(ctx.dependency)?;

        let style = ctx.params.release_style();
        let (tag, detail) = match style {
            "github" => {
                let release = ctx
                    .github
                    .latest_release(owner, repo)
                    .await
                    .map_err(|e| map_remote(ctx.dependency, e))?;
                let detail = match release.body.as_deref() {
                    Some(body) if !body.trim().is_empty() => {
                        bounded_excerpt(body, EXCERPT_MAX_LINES)
                    }
                    _ => "No changelog provided with this release.".to_string(),
                };
                (release.tag_name, detail)
            }
            "tag-only" => {
                let tags = ctx
                    .github
                    .tags(owner, repo)
                    .await
                    .map_err(|e| map_remote(ctx.dependency, e))?;
                let tag = best_release_tag(&tags)
                    .ok_or_else(|| ProbeError::no_release_found(ctx.dependency))?;
                let detail = format!("Release tag `{}` detected.", tag);
                (tag, detail)
            }
            other => {
                return Err(ProbeError::init_failed(
                    ctx.dependency,
                    format!("unsupported release_style '{}'", other),
                ))
            }
        };

        let version = strip_release_prefix(&tag).to_string();
        debug!(dependency = ctx.dependency, %tag, %version, style, "github probe discovered");

        let mut next = ctx.reference.clone();
        next.set("version", version.clone());

        Ok(Self {
            reference: ctx.reference.clone(),
            next,
            version,
            detail,
        })
    }
}

impl VersionProbe for GithubProbe {
    fn has_new_version(&self) -> bool {
        self.reference.version() != Some(self.version.as_str())
    }

    fn next_reference(&self) -> ReferenceSnapshot {
        self.next.clone()
    }

    fn extra_detail(&self) -> String {
        self.detail.clone()
    }
}

/// Split an `owner/repo` identifier
fn split_identifier(dependency: &str) -> Result<(&str, &str), ProbeError> {
    match dependency.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok((owner, repo))
        }
        _ => Err(ProbeError::init_failed(
            dependency,
            "github probe requires an owner/repo identifier",
        )),
    }
}

/// Strip one leading `v` from a release tag
fn strip_release_prefix(tag: &str) -> &str {
    tag.strip_prefix('v').unwrap_or(tag)
}

/// Pick the highest release-like tag, or None when nothing qualifies
fn best_release_tag(tags: &[Tag]) -> Option<String> {
    tags.iter()
        .filter(|t| RELEASE_TAG_RE.is_match(&t.name))
        .max_by_key(|t| lenient_version(&t.name))
        .map(|t| t.name.clone())
}

/// Lenient semver reading of a tag: leading `v` dropped, missing
/// components padded with zeros, extra components ignored
fn lenient_version(tag: &str) -> semver::Version {
    let mut parts = strip_release_prefix(tag)
        .split('.')
        .map(|p| p.parse::<u64>().unwrap_or(0));
    semver::Version::new(
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

/// Map HTTP failures: a missing repo or release object means "no release
/// found", everything else stays a probe failure
fn map_remote(dependency: &str, err: RemoteError) -> ProbeError {
    match err {
        RemoteError::NotFound { .. } => ProbeError::no_release_found(dependency),
        other => ProbeError::remote(dependency, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProbeParams;
    use crate::remote::{GithubClient, HttpClient};
    use std::time::Duration;

    fn tag(name: &str) -> Tag {
        Tag {
            name: name.to_string(),
        }
    }

    #[test]
    fn test_strip_release_prefix() {
        assert_eq!(strip_release_prefix("v1.1.0"), "1.1.0");
        assert_eq!(strip_release_prefix("1.1.0"), "1.1.0");
        // Only one leading v comes off
        assert_eq!(strip_release_prefix("vv2"), "v2");
    }

    #[test]
    fn test_best_release_tag_prefers_highest_version() {
        let tags = vec![tag("v1.9.0"), tag("v1.10.0"), tag("v1.2.3")];
        assert_eq!(best_release_tag(&tags), Some("v1.10.0".to_string()));
    }

    #[test]
    fn test_best_release_tag_ignores_non_release_names() {
        let tags = vec![tag("nightly"), tag("v0.9"), tag("rc-2.0"), tag("v1.0-beta")];
        assert_eq!(best_release_tag(&tags), Some("v0.9".to_string()));
    }

    #[test]
    fn test_best_release_tag_none_when_nothing_qualifies() {
        let tags = vec![tag("nightly"), tag("snapshot")];
        assert_eq!(best_release_tag(&tags), None);
    }

    #[test]
    fn test_lenient_version_pads_missing_components() {
        assert_eq!(lenient_version("v1.2"), semver::Version::new(1, 2, 0));
        assert_eq!(lenient_version("3.4.5"), semver::Version::new(3, 4, 5));
    }

    #[test]
    fn test_split_identifier() {
        assert_eq!(split_identifier("octocat/widgets").unwrap(), ("octocat", "widgets"));
        assert!(split_identifier("bare-name").is_err());
        assert!(split_identifier("a/b/c").is_err());
    }

    async fn discover_with(
        server: &mockito::Server,
        dependency: &str,
        params: ProbeParams,
        reference: ReferenceSnapshot,
    ) -> Result<GithubProbe, ProbeError> {
        let github = GithubClient::with_endpoints(
            None,
            Duration::from_secs(5),
            &server.url(),
            &server.url(),
        )
        .unwrap();
        let http = HttpClient::new().unwrap();
        let workdir = tempfile::tempdir().unwrap();
        let ctx = ProbeContext {
            dependency,
            params: &params,
            reference: &reference,
            github: &github,
            http: &http,
            workdir: workdir.path(),
        };
        GithubProbe::discover(&ctx).await
    }

    #[tokio::test]
    async fn test_discover_github_style_strips_v_and_detects_change() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/widgets/releases/latest")
            .with_status(200)
            .with_body(r#"{"tag_name": "v1.1.0", "name": null, "body": "- fixed things",
                           "published_at": "2024-05-01T00:00:00Z"}"#)
            .create_async()
            .await;

        let reference: ReferenceSnapshot = [("version", "1.0.0")].into_iter().collect();
        let probe = discover_with(&server, "octocat/widgets", ProbeParams::new(), reference)
            .await
            .unwrap();

        assert!(probe.has_new_version());
        assert_eq!(probe.next_reference().version(), Some("1.1.0"));
        assert_eq!(probe.extra_detail(), "- fixed things");
    }

    #[tokio::test]
    async fn test_discover_github_style_same_version_is_no_change() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/widgets/releases/latest")
            .with_status(200)
            .with_body(r#"{"tag_name": "v1.0.0", "name": null, "body": null, "published_at": null}"#)
            .create_async()
            .await;

        let reference: ReferenceSnapshot = [("version", "1.0.0")].into_iter().collect();
        let probe = discover_with(&server, "octocat/widgets", ProbeParams::new(), reference)
            .await
            .unwrap();

        assert!(!probe.has_new_version());
        assert_eq!(
            probe.extra_detail(),
            "No changelog provided with this release."
        );
    }

    #[tokio::test]
    async fn test_discover_no_release_maps_to_no_release_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/silent/releases/latest")
            .with_status(404)
            .create_async()
            .await;

        let err = discover_with(
            &server,
            "octocat/silent",
            ProbeParams::new(),
            ReferenceSnapshot::new(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProbeError::NoReleaseFound { .. }));
    }

    #[tokio::test]
    async fn test_discover_tag_only_selects_best_tag() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/widgets/tags")
            .with_status(200)
            .with_body(r#"[{"name": "v0.9.0"}, {"name": "v0.10.1"}, {"name": "experimental"}]"#)
            .create_async()
            .await;

        let params: ProbeParams = [("release_style", "tag-only")].into_iter().collect();
        let probe = discover_with(&server, "octocat/widgets", params, ReferenceSnapshot::new())
            .await
            .unwrap();

        assert!(probe.has_new_version());
        assert_eq!(probe.next_reference().version(), Some("0.10.1"));
    }

    #[tokio::test]
    async fn test_discover_tag_only_without_release_tags_fails() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/widgets/tags")
            .with_status(200)
            .with_body(r#"[{"name": "snapshot"}]"#)
            .create_async()
            .await;

        let params: ProbeParams = [("release_style", "tag-only")].into_iter().collect();
        let err = discover_with(&server, "octocat/widgets", params, ReferenceSnapshot::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::NoReleaseFound { .. }));
    }

    #[tokio::test]
    async fn test_discover_rejects_unknown_release_style() {
        let server = mockito::Server::new_async().await;
        let params: ProbeParams = [("release_style", "guess")].into_iter().collect();
        let err = discover_with(&server, "octocat/widgets", params, ReferenceSnapshot::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::InitFailed { .. }));
    }

    #[tokio::test]
    async fn test_unseen_reference_bootstraps_as_new() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/widgets/releases/latest")
            .with_status(200)
            .with_body(r#"{"tag_name": "2.0", "name": null, "body": null, "published_at": null}"#)
            .create_async()
            .await;

        let probe = discover_with(
            &server,
            "octocat/widgets",
            ProbeParams::new(),
            ReferenceSnapshot::new(),
        )
        .await
        .unwrap();

        assert!(probe.has_new_version());
        assert_eq!(probe.next_reference().version(), Some("2.0"));
    }
}
