//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Configurable timeout and User-Agent
//! - Exponential backoff retry logic (max 3 retries) for GETs
//! - Rate limit and not-found error mapping

use crate::error::RemoteError;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("relmon/", env!("CARGO_PKG_VERSION"));

/// Maximum number of retry attempts
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
const BASE_DELAY_MS: u64 = 100;

/// HTTP client wrapper with retry logic
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RemoteError> {
        Self::with_config(DEFAULT_TIMEOUT, HeaderMap::new())
    }

    /// Create a new HTTP client with a custom timeout and default headers
    pub fn with_config(timeout: Duration, default_headers: HeaderMap) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .default_headers(default_headers)
            .build()
            .map_err(|e| RemoteError::Network {
                url: String::new(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            max_retries: MAX_RETRIES,
        })
    }

    /// Set the maximum number of retries
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Perform a GET request with retry logic
    pub async fn get(&self, url: &str) -> Result<reqwest::Response, RemoteError> {
        let mut last_error = None;
        let mut delay = BASE_DELAY_MS;

        for attempt in 0..=self.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(RemoteError::RateLimited {
                            host: host_of(url),
                        });

                        if attempt < self.max_retries {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            delay *= 2;
                            continue;
                        }
                        break;
                    }

                    if response.status() == StatusCode::NOT_FOUND {
                        return Err(RemoteError::NotFound {
                            url: url.to_string(),
                        });
                    }

                    if !response.status().is_success() {
                        return Err(RemoteError::Network {
                            url: url.to_string(),
                            message: format!("HTTP {}", response.status()),
                        });
                    }

                    return Ok(response);
                }
                Err(e) => {
                    last_error = Some(if e.is_timeout() {
                        RemoteError::Timeout {
                            url: url.to_string(),
                        }
                    } else {
                        RemoteError::Network {
                            url: url.to_string(),
                            message: e.to_string(),
                        }
                    });

                    if attempt < self.max_retries {
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        delay *= 2;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| RemoteError::Network {
            url: url.to_string(),
            message: "unknown error".to_string(),
        }))
    }

    /// Perform a GET request and parse the JSON response
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, RemoteError> {
        let response = self.get(url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                url: url.to_string(),
                message: format!("failed to parse JSON: {}", e),
            })
    }

    /// Perform a GET request and return the response body as text
    pub async fn get_text(&self, url: &str) -> Result<String, RemoteError> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                url: url.to_string(),
                message: format!("failed to read text response: {}", e),
            })
    }

    /// Perform a GET request and return the raw response bytes
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                url: url.to_string(),
                message: format!("failed to read response body: {}", e),
            })?;
        Ok(bytes.to_vec())
    }

    /// Perform a POST request with a JSON body. Not retried: replaying a
    /// non-idempotent request could post the same notification twice.
    pub async fn post_json<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, RemoteError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    RemoteError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound {
                url: url.to_string(),
            });
        }

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(RemoteError::RateLimited {
                host: host_of(url),
            });
        }

        if !response.status().is_success() {
            return Err(RemoteError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        Ok(response)
    }
}

/// Extract the host portion of a URL for rate-limit error context
fn host_of(url: &str) -> String {
    url.split("://")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(url)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new();
        assert!(client.is_ok());
    }

    #[test]
    fn test_http_client_with_max_retries() {
        let client = HttpClient::new().unwrap().with_max_retries(5);
        assert_eq!(client.max_retries, 5);
    }

    #[test]
    fn test_host_of() {
        assert_eq!(host_of("https://api.github.com/repos/a/b"), "api.github.com");
        assert_eq!(host_of("http://localhost:1234/x"), "localhost:1234");
        assert_eq!(host_of("not-a-url"), "not-a-url");
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
        assert!(DEFAULT_USER_AGENT.starts_with("relmon/"));
        assert_eq!(MAX_RETRIES, 3);
    }

    #[tokio::test]
    async fn test_get_maps_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let result = client.get(&format!("{}/missing", server.url())).await;
        assert!(matches!(result, Err(RemoteError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_json_rejects_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/bad")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let client = HttpClient::new().unwrap();
        let result: Result<serde_json::Value, _> =
            client.get_json(&format!("{}/bad", server.url())).await;
        assert!(matches!(result, Err(RemoteError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_get_exhausts_retries_on_rate_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/limited")
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let client = HttpClient::new().unwrap().with_max_retries(1);
        let result = client.get(&format!("{}/limited", server.url())).await;
        assert!(matches!(result, Err(RemoteError::RateLimited { .. })));
        mock.assert_async().await;
    }
}
