//! The approved-pattern allow/deny list.
//!
//! The patterns file is a YAML list of strings. Each entry may contain
//! several comma-separated patterns; entries prefixed `!` are deny patterns.
//! A deny match blocks a usage no matter what approve patterns say, in
//! either order.

use std::fs;
use std::path::Path;

use glob::Pattern;

use crate::error::{PolicyError, Result};

/// Verdict for one `uses:` value against the pattern list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternDecision {
    /// Matched an approve pattern (and no deny pattern).
    Approved,
    /// Matched a deny pattern; wins over any approve match.
    Blocked,
    /// Matched nothing.
    NotApproved,
}

#[derive(Clone, Debug)]
struct PatternEntry {
    pattern: Pattern,
    deny: bool,
    text: String,
}

/// Compiled allow/deny pattern list.
#[derive(Clone, Debug, Default)]
pub struct PatternSet {
    entries: Vec<PatternEntry>,
}

impl PatternSet {
    /// Compile a set from raw pattern strings (already split and trimmed).
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = Vec::new();
        for raw in patterns {
            let raw = raw.as_ref();
            let (deny, text) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let pattern = Pattern::new(text).map_err(|source| PolicyError::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })?;
            entries.push(PatternEntry {
                pattern,
                deny,
                text: raw.to_string(),
            });
        }
        Ok(Self { entries })
    }

    /// Parse the YAML patterns document: a list of strings, each possibly
    /// holding several comma-separated patterns.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let value: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|source| PolicyError::InvalidPatternsFile {
                reason: source.to_string(),
            })?;
        let serde_yaml::Value::Sequence(items) = value else {
            return Err(PolicyError::InvalidPatternsFile {
                reason: "document must be a list of strings".to_string(),
            });
        };

        let mut patterns = Vec::new();
        for item in items {
            let serde_yaml::Value::String(entry) = item else {
                return Err(PolicyError::InvalidPatternsFile {
                    reason: format!("list entries must be strings, got: {item:?}"),
                });
            };
            for part in entry.split(',') {
                let part = part.trim();
                if !part.is_empty() {
                    patterns.push(part.to_string());
                }
            }
        }
        Self::from_patterns(patterns)
    }

    /// Load and parse a patterns file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Evaluate a `uses:` value. A deny match wins regardless of position.
    pub fn evaluate(&self, uses: &str) -> PatternDecision {
        let mut approved = false;
        for entry in &self.entries {
            if entry.pattern.matches(uses) {
                if entry.deny {
                    return PatternDecision::Blocked;
                }
                approved = true;
            }
        }
        if approved {
            PatternDecision::Approved
        } else {
            PatternDecision::NotApproved
        }
    }

    /// The raw pattern texts, in order (deny prefix included).
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.text.as_str())
    }

    /// Number of compiled patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the set holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
