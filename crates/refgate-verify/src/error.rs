//! Error types for verification runs.

use thiserror::Error;

/// Errors that abort a verification run.
///
/// Per-reference problems are never errors; they are collected in the
/// [`crate::CheckReport`]. Only transport-level API failures abort.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// GitHub API access failed at the transport level.
    #[error("github api error: {0}")]
    Github(#[from] refgate_github::GithubError),
}

/// Convenience type alias for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
