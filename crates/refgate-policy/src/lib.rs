//! Approved-pattern checks for GitHub Actions usage.
//!
//! Enforcement companion to the ledger: while `refgate-verify` checks that
//! the ledger's pins are truthful, this crate checks that a repository only
//! *uses* actions the patterns derived from the ledger allow. Scans every
//! workflow and composite-action YAML file under `.github`, collects each
//! `uses:` value at any nesting depth, and classifies it by prefix rule or
//! by the allow/deny glob list (deny wins).

pub mod checker;
pub mod error;
pub mod patterns;
pub mod scan;

// Re-exports for convenience.
pub use checker::{check_repository_actions, PolicyReport};
pub use error::{PolicyError, Result};
pub use patterns::{PatternDecision, PatternSet};
pub use scan::{collect_uses, workflow_files, UsesEntry};
