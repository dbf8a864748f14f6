//! Application error types using thiserror
//!
//! Error hierarchy:
//! - StoreError: reference store read/write failures
//! - ConfigError: per-repository dependency config failures
//! - ProbeError: plugin resolution and version discovery failures
//! - NotifyError: notification delivery failures
//! - RemoteError: low-level HTTP failures shared by the above

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum ScanError {
    /// Reference store related errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Dependency config related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version probe related errors
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// Notification delivery related errors
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

/// Errors related to the reference store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing document exists but cannot be parsed. Fatal to the
    /// whole pass: scanning against a partial reference baseline risks
    /// duplicate notifications.
    #[error("reference store {path} is unreadable: {message}")]
    Unreadable { path: PathBuf, message: String },

    /// Failed to read the backing document
    #[error("failed to read reference store {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to rewrite the backing document
    #[error("failed to write reference store {path}: {message}")]
    WriteError { path: PathBuf, message: String },
}

/// Errors related to fetching or parsing a repository's dependency config
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config document could not be fetched (file absent, network down).
    /// Non-fatal: the repository simply contributes zero requests.
    #[error("failed to fetch dependency config for {repo}: {message}")]
    FetchFailed { repo: String, message: String },

    /// Config document fetched but not valid TOML
    #[error("failed to parse dependency config for {repo}: {message}")]
    ParseError { repo: String, message: String },

    /// A dependency section carries a value that cannot become a parameter
    #[error("invalid value for key '{key}' in [{section}] of {repo}'s config")]
    InvalidValue {
        repo: String,
        section: String,
        key: String,
    },
}

/// Errors related to resolving and running a version probe
#[derive(Error, Debug)]
pub enum ProbeError {
    /// No plugin implementation exists for the resolved name.
    /// Non-fatal: the dependency is skipped for this pass.
    #[error("no version probe named '{plugin}' for dependency '{dependency}'")]
    UnknownPlugin { plugin: String, dependency: String },

    /// The upstream has no qualifying release or tag. Treated by callers
    /// as "no new version", not as a hard failure.
    #[error("no release found for dependency '{dependency}'")]
    NoReleaseFound { dependency: String },

    /// Probe construction failed (malformed parameters, missing files in
    /// a fetched archive, unusable response)
    #[error("version probe for '{dependency}' failed to initialize: {message}")]
    InitFailed { dependency: String, message: String },

    /// Network failure while the probe was discovering the remote version
    #[error("version probe for '{dependency}' failed: {source}")]
    Remote {
        dependency: String,
        #[source]
        source: RemoteError,
    },
}

/// Errors related to delivering a notification
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The sink could not deliver to the target repository. The staged
    /// reference for the dependency is retained so the release is
    /// re-detected on the next pass.
    #[error("failed to deliver notification to {target}: {message}")]
    DeliveryFailed { target: String, message: String },
}

/// Low-level HTTP errors shared by probes, config fetching and delivery
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Resource does not exist
    #[error("resource not found: {url}")]
    NotFound { url: String },

    /// Remote host rejected the request due to rate limiting
    #[error("rate limit exceeded for {host}")]
    RateLimited { host: String },

    /// Request exceeded the configured timeout
    #[error("timeout while fetching {url}")]
    Timeout { url: String },

    /// Network request failed
    #[error("request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Response received but not in the expected shape
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl StoreError {
    /// Creates a new Unreadable error
    pub fn unreadable(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StoreError::Unreadable {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        StoreError::WriteError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new FetchFailed error
    pub fn fetch_failed(repo: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::FetchFailed {
            repo: repo.into(),
            message: message.into(),
        }
    }

    /// Creates a new ParseError
    pub fn parse_error(repo: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            repo: repo.into(),
            message: message.into(),
        }
    }
}

impl ProbeError {
    /// Creates a new UnknownPlugin error
    pub fn unknown_plugin(plugin: impl Into<String>, dependency: impl Into<String>) -> Self {
        ProbeError::UnknownPlugin {
            plugin: plugin.into(),
            dependency: dependency.into(),
        }
    }

    /// Creates a new NoReleaseFound error
    pub fn no_release_found(dependency: impl Into<String>) -> Self {
        ProbeError::NoReleaseFound {
            dependency: dependency.into(),
        }
    }

    /// Creates a new InitFailed error
    pub fn init_failed(dependency: impl Into<String>, message: impl Into<String>) -> Self {
        ProbeError::InitFailed {
            dependency: dependency.into(),
            message: message.into(),
        }
    }

    /// Wraps a RemoteError with the owning dependency for context
    pub fn remote(dependency: impl Into<String>, source: RemoteError) -> Self {
        ProbeError::Remote {
            dependency: dependency.into(),
            source,
        }
    }
}

impl NotifyError {
    /// Creates a new DeliveryFailed error
    pub fn delivery_failed(target: impl Into<String>, message: impl Into<String>) -> Self {
        NotifyError::DeliveryFailed {
            target: target.into(),
            message: message.into(),
        }
    }
}
