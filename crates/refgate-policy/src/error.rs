//! Error types for policy checks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while checking a repository against the approved
/// patterns.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The repository path to check does not exist.
    #[error("repository path does not exist: {path}")]
    RepoNotFound { path: PathBuf },

    /// The approved-patterns file is not a list of strings.
    #[error("invalid approved patterns file: {reason}")]
    InvalidPatternsFile { reason: String },

    /// A pattern entry is not valid glob syntax.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// YAML parse failure in a workflow or patterns file.
    #[error("yaml error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// I/O error while reading files.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
