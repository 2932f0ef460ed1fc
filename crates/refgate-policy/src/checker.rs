//! The repository-level approved-pattern check.

use std::path::Path;

use crate::error::{PolicyError, Result};
use crate::patterns::{PatternDecision, PatternSet};
use crate::scan::{collect_uses, workflow_files};

/// Outcome of checking one repository.
#[derive(Debug, Default)]
pub struct PolicyReport {
    echo: bool,
    /// Full transcript, in emission order.
    pub logs: Vec<String>,
    /// One entry per disapproved or blocked usage.
    pub failures: Vec<String>,
    /// Number of workflow/action files examined.
    pub checked_files: usize,
}

impl PolicyReport {
    fn new(echo: bool) -> Self {
        Self {
            echo,
            ..Default::default()
        }
    }

    fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            println!("{message}");
        }
        self.logs.push(message);
    }

    fn failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.log(format!("    ✗ {message}"));
        self.failures.push(message);
    }

    /// Returns `true` if any usage was disapproved or blocked.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Render the verdict as Markdown for the CI step summary.
    pub fn to_step_summary_markdown(&self) -> String {
        let mut out = String::from("# GitHub Actions verification result\n\n");
        out.push_str(
            "For more information visit the [ASF Infrastructure GitHub Actions Policy](https://infra.apache.org/github-actions-policy.html) page\n\
             and the [ASF Infrastructure Actions](https://github.com/apache/infrastructure-actions) repository.\n\n",
        );
        if self.failures.is_empty() {
            out.push_str("✓ Success, all action usages match the currently approved patterns.\n");
        } else {
            out.push_str(&format!("## Failures ({})\n", self.failures.len()));
            for message in &self.failures {
                out.push_str(&format!("{message}\n\n"));
            }
        }
        out
    }
}

/// Check every action usage in a repository against the approved patterns.
///
/// Scans workflow and composite-action YAML files under `.github`. Local
/// path references and Apache/GitHub first-party prefixes are auto-approved;
/// everything else must match the pattern list, where a deny pattern wins.
pub fn check_repository_actions(
    repo_root: impl AsRef<Path>,
    patterns: &PatternSet,
    echo: bool,
) -> Result<PolicyReport> {
    let repo_root = repo_root.as_ref();
    if !repo_root.exists() {
        return Err(PolicyError::RepoNotFound {
            path: repo_root.to_path_buf(),
        });
    }

    let mut report = PolicyReport::new(echo);

    report.log(format!("There are {} entries in the approved patterns list:", patterns.len()));
    let mut sorted: Vec<&str> = patterns.texts().collect();
    sorted.sort_unstable();
    for text in sorted {
        report.log(format!("- {text}"));
    }

    let github_dir = repo_root.join(".github");
    if !github_dir.is_dir() {
        report.log(format!("No directory found at: {}", github_dir.display()));
        return Ok(report);
    }

    let files = workflow_files(&github_dir);
    tracing::debug!(files = files.len(), root = %repo_root.display(), "scanning workflow files");
    report.log(format!(
        "Found {} workflow or action YAML file(s) under {}:",
        files.len(),
        github_dir.display()
    ));

    for path in &files {
        report.checked_files += 1;
        let relative = path.strip_prefix(repo_root).unwrap_or(path);
        report.log(format!("Checking file {}", relative.display()));

        for entry in collect_uses(path)? {
            report.log(format!("  {}: {}", entry.yaml_path, entry.value));
            let uses = entry.value.as_str();

            if uses.starts_with("./") {
                report.log("    ✓ Local file reference, allowing");
            } else if uses.starts_with("docker://apache/") {
                report.log("    ✓ Apache project image, allowing");
            } else if uses.starts_with("apache/") {
                report.log("    ✓ Apache action reference, allowing");
            } else if uses.starts_with("actions/") {
                report.log("    ✓ GitHub action reference, allowing");
            } else {
                match patterns.evaluate(uses) {
                    PatternDecision::Approved => report.log("    ✓ Approved pattern"),
                    PatternDecision::Blocked => report.failure(format!(
                        "{} {}: '{}' is explicitly blocked",
                        relative.display(),
                        entry.yaml_path,
                        uses
                    )),
                    PatternDecision::NotApproved => report.failure(format!(
                        "{} {}: '{}' is not approved",
                        relative.display(),
                        entry.yaml_path,
                        uses
                    )),
                }
            }
        }
    }

    Ok(report)
}
