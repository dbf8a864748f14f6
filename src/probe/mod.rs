//! Version probes: pluggable per-ecosystem release discovery
//!
//! A probe performs its remote version discovery during construction and
//! then answers three questions: is a newer release out, what reference
//! snapshot should be persisted if this check is accepted, and what extra
//! human-readable detail belongs in the notification. The core depends
//! only on the `VersionProbe` trait; ecosystems are added by extending
//! the dispatch in `build_probe` without touching orchestration code.
//!
//! Resolution contract relied on by plugin authors: a bare dependency
//! name maps to the probe `relcheck_<name>`; an identifier containing `/`
//! maps to the shared GitHub probe. A `plugin` parameter in the config
//! section overrides both.

mod cfitsio;
mod github;

pub use cfitsio::CfitsioProbe;
pub use github::GithubProbe;

use crate::domain::{ProbeParams, ReferenceSnapshot};
use crate::error::ProbeError;
use crate::remote::{GithubClient, HttpClient};
use std::path::Path;

/// Probe name for hosted `owner/repo` dependencies
pub const GITHUB_PLUGIN: &str = "relcheck_github";

/// Prefix all named probes share
pub const PLUGIN_PREFIX: &str = "relcheck_";

/// Upper bound on lines quoted from changelogs and release notes
pub const EXCERPT_MAX_LINES: usize = 30;

/// Capability interface every version probe implements.
///
/// All discovery work happens before the probe exists, so these
/// operations are pure reads over the captured result.
pub trait VersionProbe: Send + Sync {
    /// Does the freshly discovered version differ from the reference?
    ///
    /// Exact string inequality: a changed tag counts as new even if it
    /// would sort lower. The domain question is "did upstream's tag
    /// change", not "is it semantically greater".
    fn has_new_version(&self) -> bool;

    /// The full snapshot to persist if this check is accepted. Always a
    /// detached value: the caller may discard it.
    fn next_reference(&self) -> ReferenceSnapshot;

    /// Best-effort supplementary text for the notification body
    /// (changelog excerpt, interface-change warning). Never empty.
    fn extra_detail(&self) -> String;
}

/// Everything a probe needs to construct itself
pub struct ProbeContext<'a> {
    /// Dependency identifier being checked
    pub dependency: &'a str,
    /// Parameters from the dependency's config section
    pub params: &'a ProbeParams,
    /// Reference snapshot to compare against
    pub reference: &'a ReferenceSnapshot,
    /// Shared authenticated GitHub client
    pub github: &'a GithubClient,
    /// Plain HTTP client for non-GitHub fetches
    pub http: &'a HttpClient,
    /// Private scratch directory for this check; everything the probe
    /// downloads or extracts lives here
    pub workdir: &'a Path,
}

/// Resolve the probe name for a dependency identifier
pub fn plugin_name(dependency: &str, params: &ProbeParams) -> String {
    if let Some(explicit) = params.plugin_override() {
        explicit.to_string()
    } else if dependency.contains('/') {
        GITHUB_PLUGIN.to_string()
    } else {
        format!("{}{}", PLUGIN_PREFIX, dependency)
    }
}

/// Resolve and construct the probe for a dependency
pub async fn build_probe(ctx: &ProbeContext<'_>) -> Result<Box<dyn VersionProbe>, ProbeError> {
    let name = plugin_name(ctx.dependency, ctx.params);
    match name.as_str() {
        GITHUB_PLUGIN => Ok(Box::new(GithubProbe::discover(ctx).await?)),
        "relcheck_cfitsio" => Ok(Box::new(CfitsioProbe::discover(ctx).await?)),
        other => Err(ProbeError::unknown_plugin(other, ctx.dependency)),
    }
}

/// Bound a block of text to its first `max_lines` lines
pub(crate) fn bounded_excerpt(text: &str, max_lines: usize) -> String {
    let mut lines: Vec<&str> = text.lines().take(max_lines).collect();
    while matches!(lines.last(), Some(l) if l.trim().is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_name_bare_dependency() {
        let params = ProbeParams::new();
        assert_eq!(plugin_name("cfitsio", &params), "relcheck_cfitsio");
    }

    #[test]
    fn test_plugin_name_hosted_dependency() {
        let params = ProbeParams::new();
        assert_eq!(plugin_name("octocat/widgets", &params), GITHUB_PLUGIN);
    }

    #[test]
    fn test_plugin_name_explicit_override() {
        let params: ProbeParams = [("plugin", "relcheck_cfitsio")].into_iter().collect();
        assert_eq!(plugin_name("octocat/widgets", &params), "relcheck_cfitsio");
    }

    #[test]
    fn test_bounded_excerpt_caps_lines() {
        let text = (0..100).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let excerpt = bounded_excerpt(&text, 5);
        assert_eq!(excerpt.lines().count(), 5);
        assert!(excerpt.ends_with("line 4"));
    }

    #[test]
    fn test_bounded_excerpt_short_text_untouched() {
        assert_eq!(bounded_excerpt("one\ntwo", 30), "one\ntwo");
    }

    #[test]
    fn test_bounded_excerpt_trims_trailing_blanks() {
        assert_eq!(bounded_excerpt("one\n\n\n", 30), "one");
    }
}
