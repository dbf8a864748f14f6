//! Remote access layer
//!
//! This module provides:
//! - HTTP client shared foundation with retry logic
//! - Authenticated GitHub API client (releases, tags, issues, raw files)

mod client;
mod github;

pub use client::HttpClient;
pub use github::{GithubClient, Release, Tag};
