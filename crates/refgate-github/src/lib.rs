//! Read-only GitHub REST API client.
//!
//! Exposes the three Git-data lookups the reference verifier needs behind
//! the [`GithubApi`] trait, so verification logic can run against an
//! in-memory fake in tests and the blocking [`HttpGithubApi`] in production.
//!
//! # Key Types
//!
//! - [`GithubApi`] — the query trait (commit / tag object / matching refs)
//! - [`HttpGithubApi`] — HTTPS implementation with bearer auth from the
//!   environment
//! - [`ApiResponse`] / [`ApiOutcome`] — response envelope and the shared
//!   200/404/other classification

pub mod api;
pub mod client;
pub mod error;

// Re-exports for convenience.
pub use api::{ApiOutcome, ApiResponse, GitObject, MatchingRef, TagObject};
pub use client::{token_from_env, GithubApi, HttpGithubApi, TOKEN_ENV};
pub use error::{GithubError, Result};
