//! Verification of pinned action references against live GitHub data.
//!
//! This is the enforcement half of the ledger: every commit SHA pinned in
//! the actions ledger must exist in its repository, and when a tag name is
//! declared for a pin, the pin must be among the SHAs that tag currently
//! resolves to — either the annotated tag object's own SHA or the commit it
//! dereferences to. Tags that have been re-pointed, and tags with several
//! historical SHAs, are tolerated by reconciling *sets* per tag rather than
//! single values.
//!
//! # Quick Start
//!
//! ```no_run
//! use refgate_github::HttpGithubApi;
//! use refgate_ledger::ActionLedger;
//! use refgate_verify::{verify_actions, VerifyOptions};
//!
//! let ledger = ActionLedger::load("actions.yml")?;
//! let api = HttpGithubApi::from_env()?;
//! let report = verify_actions(&ledger, &api, &VerifyOptions::default())?;
//! if report.has_failures() {
//!     eprintln!("{report}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classify;
pub mod error;
pub mod report;
pub mod verifier;

// Re-exports for convenience.
pub use classify::{classify_action, is_sha, ActionKind, WILDCARD};
pub use error::{Result, VerifyError};
pub use report::CheckReport;
pub use verifier::{verify_actions, VerifyOptions};
