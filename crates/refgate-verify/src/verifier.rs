//! The reference verifier.
//!
//! For every action in the ledger, reconcile the pinned commit SHAs against
//! what GitHub currently serves for the declared tags. Problems are
//! collected per action, never short-circuited; only transport-level API
//! failures abort the run.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use refgate_github::{ApiOutcome, GithubApi};
use refgate_ledger::{ActionLedger, ActionRefs};

use crate::classify::{classify_action, is_sha, ActionKind, WILDCARD};
use crate::error::Result;
use crate::report::CheckReport;

/// Options for one verification run.
#[derive(Clone, Debug)]
pub struct VerifyOptions {
    /// The evaluation date for expiry checks.
    pub today: NaiveDate,
    /// Echo every log line to the console as it is recorded.
    pub echo: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
            echo: true,
        }
    }
}

/// Verify every ledger entry against GitHub.
///
/// The SHAs pinned for an action must exist in its repository, and when a
/// `tag` is declared the pin must be one of the SHAs the tag currently
/// resolves to (the tag object's own SHA or the commit it dereferences to).
pub fn verify_actions(
    ledger: &ActionLedger,
    api: &dyn GithubApi,
    options: &VerifyOptions,
) -> Result<CheckReport> {
    let mut report = CheckReport::new(options.echo);
    tracing::debug!(actions = ledger.len(), today = %options.today, "verifying ledger");

    for (name, refs) in ledger.iter() {
        match classify_action(name) {
            ActionKind::Repo { owner_repo } => {
                verify_repo_action(name, &owner_repo, refs, api, options.today, &mut report)?;
            }
            ActionKind::RepoWildcard => {
                report.warning(
                    format!("Ignoring '{name}' because it uses a GitHub repository wildcard ..."),
                    "",
                );
            }
            ActionKind::DockerImage => {
                report.warning(
                    format!("Ignoring '{name}' because it references a Docker image ..."),
                    "",
                );
            }
            ActionKind::Unknown => {
                report.failure(format!("Cannot determine action kind for '{name}'"), "");
            }
        }
    }

    Ok(report)
}

/// Verify the refs of one repository action.
fn verify_repo_action(
    name: &str,
    owner_repo: &str,
    refs: &ActionRefs,
    api: &dyn GithubApi,
    today: NaiveDate,
    report: &mut CheckReport,
) -> Result<()> {
    report.log(format!(
        "Checking GitHub action {name} in GH repo 'https://github.com/{owner_repo}'..."
    ));

    // Requested pins and currently-valid SHAs, per declared tag. The
    // requested map keeps request order so the final reconciliation (and its
    // log lines) is deterministic.
    let mut requested_shas_by_tag: Vec<(String, BTreeSet<String>)> = Vec::new();
    let mut valid_shas_by_tag: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut has_wildcard = false;
    let mut wildcard_msg_emitted = false;
    // Set when an API error was explicitly ignored; downgrades the
    // "no SHAs found" verdict for this action.
    let mut has_ignored_api_errors = false;

    for (reference, details) in refs.iter() {
        if details.is_expired(today) {
            report.log(format!("  .. ref '{reference}' is expired, skipping"));
            continue;
        }

        let ignore_api_errors = details.ignore_gh_api_errors;
        if ignore_api_errors {
            report.warning(
                format!(
                    "ignore_gh_api_errors is set to true: will ignore GH API errors for action {name} ref '{reference}'"
                ),
                "  ..",
            );
        }

        if reference == WILDCARD {
            report.log("  .. detected wildcard ref");
            if !requested_shas_by_tag.is_empty() && !wildcard_msg_emitted {
                report.warning(
                    format!("GitHub action {name} references a wildcard SHA but also has specific SHAs"),
                    "    ..",
                );
                wildcard_msg_emitted = true;
            }
            has_wildcard = true;
            continue;
        }

        if !is_sha(reference) {
            report.failure(
                format!("GitHub action {name} references an invalid Git SHA '{reference}'"),
                "      ..",
            );
            continue;
        }

        report.log(format!("  .. detected entry with Git SHA '{reference}'"));
        if has_wildcard && !wildcard_msg_emitted {
            report.warning(
                format!("GitHub action {name} references a wildcard SHA but also has specific SHAs"),
                "    ..",
            );
            wildcard_msg_emitted = true;
        }

        match details.tag.as_deref() {
            None => {
                report.log("    .. no Git tag");
                let response = api.get_commit(owner_repo, reference)?;
                match response.outcome() {
                    ApiOutcome::Success => {
                        report.warning(
                            format!(
                                "GitHub action {name} references existing commit SHA '{reference}' but does not specify the tag name for it."
                            ),
                            "    ..",
                        );
                    }
                    ApiOutcome::NotFound => {
                        report.failure(
                            format!(
                                "GitHub action {name} references non existing commit SHA '{reference}': {}",
                                response.status_line()
                            ),
                            "    ..",
                        );
                    }
                    ApiOutcome::Error => {
                        let message = format!(
                            "Failed to fetch Git SHA '{reference}' from GitHub repo 'https://github.com/{owner_repo}': {}\n{}",
                            response.status_line(),
                            response.body
                        );
                        if ignore_api_errors {
                            has_ignored_api_errors = true;
                            report.warning(message, "    ..");
                        } else {
                            report.failure(message, "    ..");
                        }
                    }
                }
            }
            Some(tag) => {
                report.log(format!("    .. collecting Git SHAs for tag {tag}"));

                match requested_shas_by_tag.iter_mut().find(|(t, _)| t == tag) {
                    Some((_, requested)) => {
                        requested.insert(reference.to_string());
                    }
                    None => {
                        requested_shas_by_tag
                            .push((tag.to_string(), BTreeSet::from([reference.to_string()])));
                    }
                }
                let valid_shas_for_tag = valid_shas_by_tag.entry(tag.to_string()).or_default();

                let response = api.list_matching_refs(owner_repo, tag)?;
                if response.outcome() != ApiOutcome::Success {
                    let message = format!(
                        "Failed to fetch matching Git tags for '{tag}' from GitHub repo 'https://github.com/{owner_repo}': {}\n{}",
                        response.status_line(),
                        response.body
                    );
                    if ignore_api_errors {
                        has_ignored_api_errors = true;
                        report.warning(message, "      ..");
                    } else {
                        report.failure(message, "      ..");
                    }
                    continue;
                }

                for entry in response.matching_refs()? {
                    let object = &entry.object;
                    report.log(format!(
                        "      .. GH yields {} SHA '{}' for '{}'",
                        object.kind, object.sha, entry.ref_name
                    ));
                    match object.kind.as_str() {
                        "tag" => {
                            valid_shas_for_tag.insert(object.sha.clone());
                            // Annotated tag: one more hop to the commit it
                            // points at.
                            let deref = api.get_tag_object(owner_repo, &object.sha)?;
                            match deref.outcome() {
                                ApiOutcome::Success => {
                                    let commit_sha = deref.tag_object()?.object.sha;
                                    report.log(format!(
                                        "        .. GH returns commit SHA '{commit_sha}' for previous tag SHA"
                                    ));
                                    valid_shas_for_tag.insert(commit_sha);
                                }
                                ApiOutcome::NotFound => {
                                    report.log(format!(
                                        "        .. commit SHA '{}' does not exist",
                                        object.sha
                                    ));
                                }
                                ApiOutcome::Error => {
                                    let message = format!(
                                        "Failed to fetch details for Git tag '{tag}' from GitHub repo 'https://github.com/{owner_repo}': {}\n{}",
                                        deref.status_line(),
                                        deref.body
                                    );
                                    if ignore_api_errors {
                                        has_ignored_api_errors = true;
                                        report.warning(message, "        ..");
                                    } else {
                                        report.failure(message, "        ..");
                                    }
                                }
                            }
                        }
                        "commit" => {
                            valid_shas_for_tag.insert(object.sha.clone());
                        }
                        "branch" => {
                            report.failure(
                                format!(
                                    "Branch references mentioned for Git tag '{tag}' for GitHub action {name}"
                                ),
                                "        ..",
                            );
                        }
                        other => {
                            report.failure(
                                format!(
                                    "Invalid Git object type '{other}' for Git tag '{tag}' in GitHub repo 'https://github.com/{owner_repo}'"
                                ),
                                "        ..",
                            );
                        }
                    }
                }
            }
        }
    }

    for (tag, requested) in &requested_shas_by_tag {
        report.log(format!("  .. checking tag '{tag}'"));
        report.log(format!("    .. referenced SHAs: {}", format_sha_set(requested)));
        let empty = BTreeSet::new();
        let valid = valid_shas_by_tag.get(tag).unwrap_or(&empty);
        report.log(format!("    .. verified SHAs: {}", format_sha_set(valid)));

        if valid.is_empty() {
            let message = format!(
                "GitHub action {name} references Git tag '{tag}' via SHAs {} but no SHAs for tag could be found - does the Git tag exist?",
                format_sha_set(requested)
            );
            if has_ignored_api_errors {
                report.warning(message, "");
            } else {
                report.failure(message, "");
            }
        } else if requested.is_disjoint(valid) {
            // Confirmed data disagrees; never downgraded.
            report.failure(
                format!(
                    "GitHub action {name} references Git tag '{tag}' via SHAs {} but none of those matches the valid SHAs {}",
                    format_sha_set(requested),
                    format_sha_set(valid)
                ),
                "",
            );
        } else {
            report.log(format!(
                "  ✓ GitHub action {name} definition for tag '{tag}' is good!"
            ));
        }
    }

    Ok(())
}

/// `'a', 'b'` for a set of SHAs, `(none)` when empty.
fn format_sha_set(shas: &BTreeSet<String>) -> String {
    if shas.is_empty() {
        return "(none)".to_string();
    }
    shas.iter()
        .map(|sha| format!("'{sha}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
