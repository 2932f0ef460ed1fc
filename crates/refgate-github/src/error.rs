//! Error types for GitHub API access.
//!
//! HTTP error *statuses* are not errors here: they come back as data inside
//! [`crate::ApiResponse`] for the caller to classify. Only transport-level
//! failures (connection refused, TLS, timeouts) surface as `Err` and abort
//! the run.

use thiserror::Error;

/// Errors that can occur while talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Transport-level failure reaching the API.
    #[error("failed to fetch '{url}' from GitHub API: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// A 200 response carried a body that did not decode as expected.
    #[error("unexpected response body from '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The API credential is required but absent.
    #[error("{0} environment variable is not set or empty")]
    MissingToken(&'static str),
}

/// Convenience type alias for GitHub API operations.
pub type Result<T> = std::result::Result<T, GithubError>;
