//! Run-scoped result aggregation.

use std::fmt;

/// Append-only record of one verification run.
///
/// Messages land in three ordered lists; insertion order is significant and
/// asserted by tests. Warnings and failures are also mirrored into `logs`
/// (with an indent and status mark) so the log reads as a full transcript.
#[derive(Debug, Default)]
pub struct CheckReport {
    echo: bool,
    /// Full transcript, in emission order.
    pub logs: Vec<String>,
    /// Warning messages, bare (no indent or mark).
    pub warnings: Vec<String>,
    /// Failure messages, bare (no indent or mark).
    pub failures: Vec<String>,
}

impl CheckReport {
    /// Create a report. With `echo`, every log line is also printed to the
    /// console as it is recorded.
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            ..Default::default()
        }
    }

    /// Record a log line.
    pub fn log(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.echo {
            println!("{message}");
        }
        self.logs.push(message);
    }

    /// Record a failure. The transcript line is indented and marked.
    pub fn failure(&mut self, message: impl Into<String>, indent: &str) {
        let message = message.into();
        self.log(format!("{indent} ✗ {message}"));
        self.failures.push(message);
    }

    /// Record a warning. The transcript line is indented and marked.
    pub fn warning(&mut self, message: impl Into<String>, indent: &str) {
        let message = message.into();
        self.log(format!("{indent} ⚡ {message}"));
        self.warnings.push(message);
    }

    /// Returns `true` if any failure was recorded.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Returns `true` if any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Render the report as Markdown for the CI step summary.
    pub fn to_step_summary_markdown(&self) -> String {
        let mut out = String::from("# GitHub Actions verification result\n");
        if !self.failures.is_empty() {
            out.push_str(&format!("## Failures ({})\n", self.failures.len()));
            out.push_str("```\n");
            for message in &self.failures {
                out.push_str(&format!("{message}\n\n"));
            }
            out.push_str("```\n");
        }
        if !self.warnings.is_empty() {
            out.push_str(&format!("## Warnings ({})\n", self.warnings.len()));
            out.push_str("```\n");
            for message in &self.warnings {
                out.push_str(&format!("{message}\n\n"));
            }
            out.push_str("```\n");
        }
        out.push_str("## Log\n```\n");
        for message in &self.logs {
            out.push_str(&format!("{message}\n"));
        }
        out.push_str("```\n");
        out
    }
}

/// The summary rendering: all failures, then all warnings.
impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.failures {
            writeln!(f, "FAILURE: {message}")?;
        }
        for message in &self.warnings {
            writeln!(f, "WARNING: {message}")?;
        }
        Ok(())
    }
}
