//! Action-name and reference-token classification.
//!
//! Valid action names:
//! - `OWNER/REPO` with an optional path suffix, e.g.
//!   `gradle/actions/setup-gradle` (verifiable against the `gradle/actions`
//!   repository)
//! - `OWNER/*` — a repository wildcard; nothing to verify
//! - `docker://...` — a container image; nothing to verify
//!
//! Reference tokens are either a lowercase-hex commit SHA of at least 7
//! characters (conventionally 40) or the literal wildcard `*`.

use std::sync::LazyLock;

use regex::Regex;

static RE_REPO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+)(/.+)?$").unwrap());

static RE_REPO_WILDCARD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+/[*]$").unwrap());

static RE_DOCKER_IMAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^docker://.+").unwrap());

static RE_GIT_SHA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-f0-9]{7,}$").unwrap());

/// The wildcard reference token.
pub const WILDCARD: &str = "*";

/// What kind of thing an action name refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionKind {
    /// A GitHub repository action; `owner_repo` is the repository the pinned
    /// SHAs live in (any path suffix stripped).
    Repo { owner_repo: String },
    /// `OWNER/*` — skipped with a warning.
    RepoWildcard,
    /// `docker://...` — skipped with a warning.
    DockerImage,
    /// Unparseable; a hard failure.
    Unknown,
}

/// Classify an action name.
pub fn classify_action(name: &str) -> ActionKind {
    if let Some(captures) = RE_REPO.captures(name) {
        return ActionKind::Repo {
            owner_repo: captures[1].to_string(),
        };
    }
    if RE_REPO_WILDCARD.is_match(name) {
        return ActionKind::RepoWildcard;
    }
    if RE_DOCKER_IMAGE.is_match(name) {
        return ActionKind::DockerImage;
    }
    ActionKind::Unknown
}

/// Returns `true` if the token looks like a Git commit SHA.
pub fn is_sha(token: &str) -> bool {
    RE_GIT_SHA.is_match(token)
}
