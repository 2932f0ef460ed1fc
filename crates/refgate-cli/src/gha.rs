//! GitHub Actions CI surface.
//!
//! Thin helpers around the workflow-command and step-summary conventions.
//! Everything here is a no-op outside of a GitHub Actions run.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;

/// Returns `true` when running inside a GitHub Actions step.
pub fn on_gha() -> bool {
    env::var_os("GITHUB_ACTION").is_some()
}

/// Open a collapsible output group.
pub fn begin_group(title: &str) {
    if on_gha() {
        println!("::group::{title}");
    }
}

/// Close the current output group.
pub fn end_group() {
    if on_gha() {
        println!("::endgroup::");
    }
}

/// Print content inside a titled group. Does nothing outside GitHub Actions.
pub fn group_print(title: &str, content: &str) {
    if !on_gha() {
        return;
    }
    println!("::group::{title}");
    println!("{content}");
    println!("::endgroup::");
}

/// Append Markdown to the job's step summary, if the runner provides one.
pub fn append_step_summary(markdown: &str) -> std::io::Result<()> {
    let Some(path) = env::var_os("GITHUB_STEP_SUMMARY") else {
        return Ok(());
    };
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(markdown.as_bytes())
}
