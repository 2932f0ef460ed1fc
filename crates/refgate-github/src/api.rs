//! API response envelope and outcome classification.

use serde::Deserialize;

use crate::error::{GithubError, Result};

/// A completed HTTP exchange with the GitHub API.
///
/// Error statuses are carried here as data; the caller decides what a 404
/// means for its own verification logic.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    /// The full request URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// HTTP reason phrase ("OK", "Not Found", ...).
    pub reason: String,
    /// Raw response body.
    pub body: String,
}

/// Three-way classification of an API response.
///
/// The 200/404/other branch recurs at every call site; classifying once here
/// keeps the tie-break logic from drifting apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApiOutcome {
    /// 200 — the object exists and the body is usable.
    Success,
    /// 404 — the object does not exist; not a transport problem.
    NotFound,
    /// Anything else — transient or unclassified API error.
    Error,
}

impl ApiResponse {
    /// Classify this response.
    pub fn outcome(&self) -> ApiOutcome {
        match self.status {
            200 => ApiOutcome::Success,
            404 => ApiOutcome::NotFound,
            _ => ApiOutcome::Error,
        }
    }

    /// `HTTP/<status>: <reason>, API URL: <url>` — the suffix every failure
    /// message carries.
    pub fn status_line(&self) -> String {
        format!("HTTP/{}: {}, API URL: {}", self.status, self.reason, self.url)
    }

    /// Decode the body of a 200 response.
    pub fn decode<'a, T: Deserialize<'a>>(&'a self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|source| GithubError::Decode {
            url: self.url.clone(),
            source,
        })
    }

    /// Decode a `matching-refs` body.
    pub fn matching_refs(&self) -> Result<Vec<MatchingRef>> {
        self.decode()
    }

    /// Decode a tag-object body.
    pub fn tag_object(&self) -> Result<TagObject> {
        self.decode()
    }
}

/// One entry of a `matching-refs` listing.
#[derive(Clone, Debug, Deserialize)]
pub struct MatchingRef {
    /// Fully qualified ref name, e.g. `refs/tags/v1.2.3`.
    #[serde(rename = "ref")]
    pub ref_name: String,
    /// The Git object the ref points at.
    pub object: GitObject,
}

/// A Git object reference as returned by the refs endpoints.
#[derive(Clone, Debug, Deserialize)]
pub struct GitObject {
    /// Object type: `tag`, `commit`, `branch`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Object SHA.
    pub sha: String,
}

/// Body of a tag-object lookup. For annotated tags `object` is the commit
/// (or nested tag) the tag points at.
#[derive(Clone, Debug, Deserialize)]
pub struct TagObject {
    pub object: GitObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            url: "https://api.github.com/repos/octo/action/git/commits/abc".into(),
            status,
            reason: match status {
                200 => "OK".into(),
                404 => "Not Found".into(),
                _ => "Forbidden".into(),
            },
            body: body.into(),
        }
    }

    #[test]
    fn outcome_classification() {
        assert_eq!(response(200, "").outcome(), ApiOutcome::Success);
        assert_eq!(response(404, "").outcome(), ApiOutcome::NotFound);
        assert_eq!(response(403, "").outcome(), ApiOutcome::Error);
        assert_eq!(response(500, "").outcome(), ApiOutcome::Error);
    }

    #[test]
    fn status_line_format() {
        assert_eq!(
            response(404, "").status_line(),
            "HTTP/404: Not Found, API URL: https://api.github.com/repos/octo/action/git/commits/abc"
        );
    }

    #[test]
    fn decodes_matching_refs() {
        let body = r#"[
            {"ref": "refs/tags/v1.0.0", "object": {"type": "tag", "sha": "aaa111"}},
            {"ref": "refs/tags/v1.0.1", "object": {"type": "commit", "sha": "bbb222"}}
        ]"#;
        let refs = response(200, body).matching_refs().unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].ref_name, "refs/tags/v1.0.0");
        assert_eq!(refs[0].object.kind, "tag");
        assert_eq!(refs[1].object.sha, "bbb222");
    }

    #[test]
    fn decodes_tag_object() {
        let body = r#"{"tag": "v1.0.0", "object": {"type": "commit", "sha": "ccc333"}}"#;
        let tag = response(200, body).tag_object().unwrap();
        assert_eq!(tag.object.sha, "ccc333");
        assert_eq!(tag.object.kind, "commit");
    }

    #[test]
    fn decode_failure_names_url() {
        let err = response(200, "not json").matching_refs().unwrap_err();
        assert!(err.to_string().contains("git/commits/abc"));
    }
}
