//! CLI argument parsing module for relmon

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Environment variable consulted when --token is not given
pub const TOKEN_ENV_VAR: &str = "RELMON_TOKEN";

/// Validate an `owner/repo` repository name
fn parse_repo(s: &str) -> Result<String, String> {
    let s = s.trim();
    match s.split_once('/') {
        Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
            Ok(s.to_string())
        }
        _ => Err(format!("expected owner/repo, got '{}'", s)),
    }
}

/// Upstream release monitor
#[derive(Parser, Debug, Clone)]
#[command(
    name = "relmon",
    version,
    about = "Polls tracked dependencies for new releases and files issues on the repositories that track them"
)]
pub struct CliArgs {
    /// Repository to scan for a dependency config (owner/repo, can be
    /// specified multiple times)
    #[arg(long = "repo", value_parser = parse_repo, action = ArgAction::Append, required = true)]
    pub repos: Vec<String>,

    /// Path to the reference store document
    #[arg(long, default_value = "references.yml")]
    pub refs: PathBuf,

    /// File name of the dependency config in each repository's root
    #[arg(long, default_value = "relmon.toml")]
    pub config_name: String,

    /// Branch the dependency config is fetched from
    #[arg(long, default_value = "master")]
    pub branch: String,

    // General options
    /// Dry run mode - render notifications locally instead of posting
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip rewriting the reference store after the pass
    #[arg(long)]
    pub no_persist: bool,

    /// API token for issue creation (falls back to RELMON_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// GitHub API endpoint (override for self-hosted instances)
    #[arg(long, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Raw file endpoint used for config fetching
    #[arg(long, default_value = "https://raw.githubusercontent.com")]
    pub raw_url: String,

    /// HTTP timeout in seconds for every remote operation
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    // Output options
    /// Output the scan report in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable quiet mode - failures only
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Token from the flag, falling back to the environment
    pub fn resolved_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
    }
}
