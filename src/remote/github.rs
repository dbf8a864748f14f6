//! GitHub API client
//!
//! Authenticated access to the endpoints the monitor needs: latest
//! release, tag listing, issue creation and raw config file fetching.
//! Base URLs are configurable so self-hosted GitHub instances (and test
//! servers) can be targeted. The client is constructed once per batch and
//! shared by reference; reqwest's internal pool makes it safe for
//! concurrent use.

use crate::error::RemoteError;
use crate::remote::HttpClient;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Public raw file endpoint
pub const DEFAULT_RAW_URL: &str = "https://raw.githubusercontent.com";

/// A published release as returned by the releases API
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    /// Git tag the release points at
    pub tag_name: String,
    /// Human release title
    pub name: Option<String>,
    /// Release notes body, when the publisher wrote any
    pub body: Option<String>,
    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,
}

/// A repository tag as returned by the tags API
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: String,
}

#[derive(Debug, Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    body: &'a str,
}

/// Shared GitHub client
pub struct GithubClient {
    http: HttpClient,
    api_url: String,
    raw_url: String,
}

impl GithubClient {
    /// Create a client against the public GitHub endpoints
    pub fn new(token: Option<&str>, timeout: Duration) -> Result<Self, RemoteError> {
        Self::with_endpoints(token, timeout, DEFAULT_API_URL, DEFAULT_RAW_URL)
    }

    /// Create a client against custom endpoints (GitHub Enterprise, tests)
    pub fn with_endpoints(
        token: Option<&str>,
        timeout: Duration,
        api_url: &str,
        raw_url: &str,
    ) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|_| {
                RemoteError::Network {
                    url: api_url.to_string(),
                    message: "token contains characters not valid in a header".to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            http: HttpClient::with_config(timeout, headers)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            raw_url: raw_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the latest published release of a repository
    pub async fn latest_release(&self, owner: &str, repo: &str) -> Result<Release, RemoteError> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.api_url, owner, repo);
        self.http.get_json(&url).await
    }

    /// List the tags of a repository
    pub async fn tags(&self, owner: &str, repo: &str) -> Result<Vec<Tag>, RemoteError> {
        let url = format!("{}/repos/{}/{}/tags", self.api_url, owner, repo);
        self.http.get_json(&url).await
    }

    /// Open an issue on the target repository (`owner/repo`)
    pub async fn create_issue(
        &self,
        target: &str,
        title: &str,
        body: &str,
    ) -> Result<(), RemoteError> {
        let url = format!("{}/repos/{}/issues", self.api_url, target);
        let issue = NewIssue { title, body };
        self.http.post_json(&url, &issue).await?;
        Ok(())
    }

    /// Fetch a file from a repository branch via the raw endpoint
    pub async fn raw_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<String, RemoteError> {
        let url = format!("{}/{}/{}/{}", self.raw_url, repo, branch, path);
        self.http.get_text(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn client_for(server: &mockito::Server) -> GithubClient {
        GithubClient::with_endpoints(
            Some("t0ken"),
            Duration::from_secs(5),
            &server.url(),
            &server.url(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_release() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/octocat/widgets/releases/latest")
            .match_header("authorization", "Bearer t0ken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"tag_name": "v1.2.0", "name": "1.2.0", "body": "Fixes.",
                    "published_at": "2024-03-01T00:00:00Z"}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server).await;
        let release = client.latest_release("octocat", "widgets").await.unwrap();
        mock.assert_async().await;
        assert_eq!(release.tag_name, "v1.2.0");
        assert_eq!(release.body.as_deref(), Some("Fixes."));
    }

    #[tokio::test]
    async fn test_latest_release_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/silent/releases/latest")
            .with_status(404)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let result = client.latest_release("octocat", "silent").await;
        assert!(matches!(result, Err(RemoteError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_tags() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/repos/octocat/widgets/tags")
            .with_status(200)
            .with_body(r#"[{"name": "v2.0.0"}, {"name": "v1.9.1"}]"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let tags = client.tags("octocat", "widgets").await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].name, "v2.0.0");
    }

    #[tokio::test]
    async fn test_create_issue() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/repos/octocat/widgets/issues")
            .match_header("authorization", "Bearer t0ken")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"title": "Upstream release of dependency: cfitsio"}"#.to_string(),
            ))
            .with_status(201)
            .with_body(r#"{"number": 7}"#)
            .create_async()
            .await;

        let client = client_for(&server).await;
        client
            .create_issue(
                "octocat/widgets",
                "Upstream release of dependency: cfitsio",
                "body text",
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_raw_file() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/octocat/widgets/master/relmon.toml")
            .with_status(200)
            .with_body("[cfitsio]\n")
            .create_async()
            .await;

        let client = client_for(&server).await;
        let text = client
            .raw_file("octocat/widgets", "master", "relmon.toml")
            .await
            .unwrap();
        assert_eq!(text, "[cfitsio]\n");
    }
}
