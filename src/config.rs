//! Per-repository dependency configuration
//!
//! Each scanned repository carries a flat TOML document in its root with
//! one table per tracked dependency; the table's key/value pairs become
//! that dependency's probe parameters verbatim. Fetching is abstracted
//! behind `ConfigSource` so the scanner can be driven from fixtures.

use crate::domain::{DependencyRequest, ProbeParams};
use crate::error::ConfigError;
use crate::remote::GithubClient;
use async_trait::async_trait;
use std::sync::Arc;

/// File name looked up in each repository's root by default
pub const DEFAULT_CONFIG_NAME: &str = "relmon.toml";

/// Source of a repository's raw dependency config document
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Fetch the raw config document for a repository (`owner/repo`)
    async fn fetch(&self, repo: &str) -> Result<String, ConfigError>;
}

/// Fetches the config file from the repository's branch via the raw
/// file endpoint
pub struct RawFileConfigSource {
    github: Arc<GithubClient>,
    branch: String,
    file_name: String,
}

impl RawFileConfigSource {
    /// Create a source reading `file_name` from `branch` of each repo
    pub fn new(
        github: Arc<GithubClient>,
        branch: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            github,
            branch: branch.into(),
            file_name: file_name.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for RawFileConfigSource {
    async fn fetch(&self, repo: &str) -> Result<String, ConfigError> {
        self.github
            .raw_file(repo, &self.branch, &self.file_name)
            .await
            .map_err(|e| ConfigError::fetch_failed(repo, e.to_string()))
    }
}

/// Parse a repository's config document into dependency requests.
///
/// Every top-level table becomes one request keyed by the table name;
/// scalar values are coerced to strings, anything nested is rejected.
pub fn parse_repo_config(
    repo: &str,
    document: &str,
) -> Result<Vec<DependencyRequest>, ConfigError> {
    let table: toml::Table =
        toml::from_str(document).map_err(|e| ConfigError::parse_error(repo, e.to_string()))?;

    let mut requests = Vec::new();
    for (section, value) in table {
        let toml::Value::Table(entries) = value else {
            return Err(ConfigError::parse_error(
                repo,
                format!("top-level key '{}' is not a dependency table", section),
            ));
        };

        let mut params = ProbeParams::new();
        for (key, value) in entries {
            let scalar = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        repo: repo.to_string(),
                        section: section.clone(),
                        key,
                    })
                }
            };
            params.set(key, scalar);
        }

        requests.push(DependencyRequest::new(section, repo, params));
    }

    Ok(requests)
}
