//! Ledger of pinned GitHub Actions references.
//!
//! The ledger is a hand-maintained YAML document mapping each third-party
//! action to the commit SHAs approved for it, with optional expiry, tag, and
//! keep metadata per reference. This crate owns the document model and the
//! maintenance operations; verification against live GitHub data lives in
//! `refgate-verify`.
//!
//! # Key Types
//!
//! - [`ActionLedger`] — ordered map of action name → pinned references
//! - [`ActionRefs`] — ordered map of reference token → [`RefDetails`]
//! - [`RefDetails`] — expiry / keep / tag / ignore-errors metadata
//!
//! Both maps preserve document order; verification output is defined in
//! terms of it.

pub mod document;
pub mod error;
pub mod maintenance;
pub mod types;

// Re-exports for convenience.
pub use error::{LedgerError, Result};
pub use maintenance::{
    calculate_expiry, create_pattern, generate_workflow, parse_workflow_uses, remove_expired_refs,
    update_refs, WorkflowUse,
};
pub use types::{ActionLedger, ActionRefs, RefDetails};
