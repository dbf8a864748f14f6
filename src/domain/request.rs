//! Dependency request structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved parameter key that overrides name-derived plugin selection
pub const PLUGIN_PARAM: &str = "plugin";

/// Reserved parameter key selecting the release style for hosted probes
pub const RELEASE_STYLE_PARAM: &str = "release_style";

/// Release style used when a config section does not specify one
pub const DEFAULT_RELEASE_STYLE: &str = "github";

/// Dependency-specific parameters, taken verbatim from the key/value
/// pairs of the dependency's config section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbeParams(BTreeMap<String, String>);

impl ProbeParams {
    /// Creates an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a parameter key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Sets a parameter
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the explicit plugin override, if the section carried one
    pub fn plugin_override(&self) -> Option<&str> {
        self.get(PLUGIN_PARAM)
    }

    /// Returns the requested release style, defaulting to `github`
    pub fn release_style(&self) -> &str {
        self.get(RELEASE_STYLE_PARAM).unwrap_or(DEFAULT_RELEASE_STYLE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProbeParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One repository's request to be notified about one dependency.
/// Several repositories may request the same dependency; the scanner
/// collapses those to a single version check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRequest {
    /// Dependency identifier: a bare plugin-backed name, or an
    /// `owner/repo` string for hosted dependencies
    pub dependency: String,
    /// Repository that receives the notification (`owner/repo`)
    pub repo: String,
    /// Parameters from the dependency's config section
    pub params: ProbeParams,
}

impl DependencyRequest {
    /// Creates a new request
    pub fn new(
        dependency: impl Into<String>,
        repo: impl Into<String>,
        params: ProbeParams,
    ) -> Self {
        Self {
            dependency: dependency.into(),
            repo: repo.into(),
            params,
        }
    }
}

impl fmt::Display for DependencyRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (requested by {})", self.dependency, self.repo)
    }
}
