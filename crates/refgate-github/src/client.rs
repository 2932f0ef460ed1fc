//! The query trait and its HTTP implementation.

use std::env;

use crate::api::ApiResponse;
use crate::error::{GithubError, Result};

/// Environment variable holding the API credential.
///
/// Unauthenticated GitHub API requests are heavily rate-limited; supply a
/// token whenever possible (`export GH_TOKEN=$(gh auth token)`).
pub const TOKEN_ENV: &str = "GH_TOKEN";

const API_BASE: &str = "https://api.github.com";
const ACCEPT: &str = "application/vnd.github.v3+json";
const API_VERSION: &str = "2022-11-28";

/// Read-only queries against a GitHub repository's Git data.
///
/// The three operations the verifier needs. Implementations must be
/// synchronous; an `Err` means a transport-level failure and aborts the
/// calling run, while HTTP error statuses come back inside the response.
pub trait GithubApi {
    /// `GET /repos/{owner_repo}/git/commits/{sha}` — does this commit exist?
    fn get_commit(&self, owner_repo: &str, sha: &str) -> Result<ApiResponse>;

    /// `GET /repos/{owner_repo}/git/tags/{tag_sha}` — dereference an
    /// annotated tag object to the commit it points at.
    fn get_tag_object(&self, owner_repo: &str, tag_sha: &str) -> Result<ApiResponse>;

    /// `GET /repos/{owner_repo}/git/matching-refs/tags/{tag}` — all tag refs
    /// matching a tag name.
    fn list_matching_refs(&self, owner_repo: &str, tag: &str) -> Result<ApiResponse>;
}

/// Read the API token from the environment, treating empty as unset.
pub fn token_from_env() -> Option<String> {
    env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty())
}

/// [`GithubApi`] over HTTPS with a blocking client.
pub struct HttpGithubApi {
    client: reqwest::blocking::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpGithubApi {
    /// Create a client with an explicit (optional) bearer token.
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(API_BASE, token)
    }

    /// Create a client using [`TOKEN_ENV`] from the environment, if set.
    pub fn from_env() -> Result<Self> {
        Self::new(token_from_env())
    }

    /// Create a client against a non-default API base URL (tests).
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("refgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(GithubError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    /// Returns `true` if the client will authenticate its requests.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn get(&self, path: &str) -> Result<ApiResponse> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GitHub API GET");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|source| GithubError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
        let body = response.text().map_err(|source| GithubError::Transport {
            url: url.clone(),
            source,
        })?;

        Ok(ApiResponse {
            url,
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

impl GithubApi for HttpGithubApi {
    fn get_commit(&self, owner_repo: &str, sha: &str) -> Result<ApiResponse> {
        self.get(&format!("/repos/{owner_repo}/git/commits/{sha}"))
    }

    fn get_tag_object(&self, owner_repo: &str, tag_sha: &str) -> Result<ApiResponse> {
        self.get(&format!("/repos/{owner_repo}/git/tags/{tag_sha}"))
    }

    fn list_matching_refs(&self, owner_repo: &str, tag: &str) -> Result<ApiResponse> {
        self.get(&format!("/repos/{owner_repo}/git/matching-refs/tags/{tag}"))
    }
}
