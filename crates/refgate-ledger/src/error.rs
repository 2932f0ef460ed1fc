//! Error types for ledger operations.

use thiserror::Error;

/// Errors that can occur while loading, storing, or maintaining the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// More than one ref of an action qualifies for auto-update.
    #[error("multiple candidates for auto-updates for {name}")]
    MultipleUpdateCandidates { name: String },

    /// A `uses:` step in a workflow could not be split into name@ref.
    #[error("malformed uses step: {line}")]
    MalformedUses { line: String },

    /// YAML parse or emit failure.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error while reading or writing the ledger file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
