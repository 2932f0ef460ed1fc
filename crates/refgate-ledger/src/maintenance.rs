//! Maintenance operations over the ledger.
//!
//! These are the write-side companions of verification: expiring stale
//! references, regenerating the approved-pattern list, and the dummy-workflow
//! round trip that lets automated dependency updates feed new pins back into
//! the ledger.

use std::sync::LazyLock;

use chrono::{Duration, NaiveDate};
use regex::Regex;

use crate::error::{LedgerError, Result};
use crate::types::{ActionLedger, RefDetails};

/// Matches one `uses:` step line of a dummy workflow, capturing the action
/// name, the ref, and the optional trailing tag comment.
static RE_USES_STEP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-\s+uses:\s*([^@\s]+)@(\S+)(?:\s+#\s*(\S+))?\s*$").unwrap()
});

/// Loose probe for step lines that are supposed to be `uses:` steps.
static RE_USES_PROBE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s+uses:").unwrap());

/// Calculate an expiration date `weeks` weeks after `today`.
pub fn calculate_expiry(today: NaiveDate, weeks: i64) -> NaiveDate {
    today + Duration::weeks(weeks)
}

/// Render the `name@ref` allow-pattern list for all live references.
///
/// A reference is included when it has not expired as of `today`, or when it
/// is marked `keep`.
pub fn create_pattern(ledger: &ActionLedger, today: NaiveDate) -> Vec<String> {
    let mut patterns = Vec::new();
    for (name, refs) in ledger.iter() {
        for (reference, details) in refs.iter() {
            let live = match details.expires_at {
                Some(expires) => today < expires,
                None => true,
            };
            if live || details.keep {
                patterns.push(format!("{name}@{reference}"));
            }
        }
    }
    patterns
}

/// Drop references with `expires_at <= today` that are not marked `keep`,
/// then drop actions left with no references at all.
pub fn remove_expired_refs(ledger: &mut ActionLedger, today: NaiveDate) {
    let mut to_remove: Vec<(String, String)> = Vec::new();
    for (name, refs) in ledger.iter() {
        for (reference, details) in refs.iter() {
            let expired = matches!(details.expires_at, Some(expires) if expires <= today);
            if expired && !details.keep {
                to_remove.push((name.to_string(), reference.to_string()));
            }
        }
    }

    for (name, reference) in to_remove {
        if let Some(refs) = ledger.get_mut(&name) {
            refs.remove(&reference);
            tracing::debug!(action = %name, reference = %reference, "removed expired ref");
        }
    }

    ledger.retain(|_, refs| !refs.is_empty());
}

/// A `uses:` step parsed out of a dummy workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkflowUse {
    pub name: String,
    pub reference: String,
    pub tag: Option<String>,
}

/// Generate the dummy workflow used for automated ref updates.
///
/// Each action contributes at most one step, for its single auto-updatable
/// ref: a full-length pin (40+ characters) with neither `keep` nor
/// `expires_at` set. More than one such candidate is an error.
///
/// The workflow is rendered as a string rather than through a YAML emitter:
/// workflow files use constructs (keys without values) that round-trip badly.
pub fn generate_workflow(ledger: &ActionLedger) -> Result<String> {
    let header = "\
name: Dummy Workflow

on:
  workflow_dispatch:
  pull_request:
    paths:
      - .github/workflows/dummy.yml
  push:
    paths:
      - .github/workflows/dummy.yml

permissions: {}

jobs:
  dummy:
    runs-on: ubuntu-latest
    steps:
";

    let mut steps = Vec::new();
    for (name, refs) in ledger.iter() {
        let updatable: Vec<(&str, &RefDetails)> = refs
            .iter()
            .filter(|(reference, details)| {
                reference.len() >= 40 && !details.keep && details.expires_at.is_none()
            })
            .collect();

        match updatable.as_slice() {
            [] => {}
            [(reference, details)] => {
                let comment = details
                    .tag
                    .as_deref()
                    .map(|tag| format!("  # {tag}"))
                    .unwrap_or_default();
                steps.push(format!("      - uses: {name}@{reference}{comment}"));
                steps.push("        if: false".to_string());
            }
            _ => {
                return Err(LedgerError::MultipleUpdateCandidates {
                    name: name.to_string(),
                })
            }
        }
    }

    Ok(format!(
        "{header}{}\n      - run: echo Success!\n",
        steps.join("\n")
    ))
}

/// Parse the `uses:` steps back out of a dummy workflow.
///
/// The trailing `# tag` comment carries the tag name through the round trip.
/// A `uses:` step without a `name@ref` value is an error; other lines
/// (including the closing `run:` step) are ignored.
pub fn parse_workflow_uses(workflow: &str) -> Result<Vec<WorkflowUse>> {
    let mut uses = Vec::new();
    for line in workflow.lines() {
        match RE_USES_STEP.captures(line) {
            Some(captures) => uses.push(WorkflowUse {
                name: captures[1].to_string(),
                reference: captures[2].to_string(),
                tag: captures.get(3).map(|m| m.as_str().to_string()),
            }),
            None if RE_USES_PROBE.is_match(line) => {
                return Err(LedgerError::MalformedUses {
                    line: line.trim().to_string(),
                })
            }
            None => {}
        }
    }
    Ok(uses)
}

/// Fold dummy-workflow steps back into the ledger.
///
/// A ref the ledger does not know yet is appended to its action (creating
/// the action if needed); when that happens, every existing non-`keep`
/// sibling has its expiry clamped to at most `today` + 12 weeks, starting
/// the retirement clock on the superseded pins.
pub fn update_refs(ledger: &mut ActionLedger, uses: &[WorkflowUse], today: NaiveDate) {
    for step in uses {
        let refs = ledger.entry(&step.name);
        if refs.contains(&step.reference) {
            continue;
        }

        let new_expiry = calculate_expiry(today, 12);
        for (_, details) in refs.iter_mut() {
            if details.keep {
                continue;
            }
            match details.expires_at {
                Some(existing) if existing <= new_expiry => {}
                _ => details.expires_at = Some(new_expiry),
            }
        }

        let details = RefDetails {
            tag: step.tag.clone(),
            ..Default::default()
        };
        tracing::debug!(action = %step.name, reference = %step.reference, "adding new ref");
        refs.insert(step.reference.clone(), details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA_A: &str = "08c6903cd8c0fde910a37f88322edcfb5dd907a8";
    const SHA_B: &str = "3e125ece5c3e5248e18da9ed8d2cce3d335ec8dd";
    const SHA_C: &str = "17575ea4e18dd928fe5968dbe32294b97923d65b";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn detail(tag: Option<&str>, expires: Option<NaiveDate>, keep: bool) -> RefDetails {
        RefDetails {
            expires_at: expires,
            keep,
            tag: tag.map(String::from),
            ignore_gh_api_errors: false,
        }
    }

    #[test]
    fn expiry_is_weeks_from_today() {
        assert_eq!(calculate_expiry(date(2026, 1, 1), 4), date(2026, 1, 29));
        assert_eq!(calculate_expiry(date(2026, 1, 1), 12), date(2026, 3, 26));
    }

    #[test]
    fn pattern_excludes_expired_refs() {
        let mut ledger = ActionLedger::new();
        let refs = ledger.entry("octo/action");
        refs.insert(SHA_A, detail(Some("v1"), Some(date(2026, 1, 1)), false));
        refs.insert(SHA_B, detail(Some("v2"), None, false));

        let patterns = create_pattern(&ledger, date(2026, 2, 1));
        assert_eq!(patterns, vec![format!("octo/action@{SHA_B}")]);
    }

    #[test]
    fn pattern_keeps_expired_keep_refs() {
        let mut ledger = ActionLedger::new();
        let refs = ledger.entry("octo/action");
        refs.insert(SHA_A, detail(None, Some(date(2026, 1, 1)), true));

        let patterns = create_pattern(&ledger, date(2026, 2, 1));
        assert_eq!(patterns, vec![format!("octo/action@{SHA_A}")]);
    }

    #[test]
    fn pattern_excludes_refs_expiring_today() {
        let mut ledger = ActionLedger::new();
        ledger
            .entry("octo/action")
            .insert(SHA_A, detail(None, Some(date(2026, 2, 1)), false));

        // expires_at == today is no longer live (strict today < expires_at)
        assert!(create_pattern(&ledger, date(2026, 2, 1)).is_empty());
        assert_eq!(create_pattern(&ledger, date(2026, 1, 31)).len(), 1);
    }

    #[test]
    fn remove_expired_drops_refs_and_empty_actions() {
        let mut ledger = ActionLedger::new();
        ledger
            .entry("octo/gone")
            .insert(SHA_A, detail(None, Some(date(2026, 1, 1)), false));
        let survivor = ledger.entry("octo/stays");
        survivor.insert(SHA_B, detail(None, Some(date(2026, 1, 1)), true));
        survivor.insert(SHA_C, detail(None, None, false));

        remove_expired_refs(&mut ledger, date(2026, 1, 1));

        assert!(ledger.get("octo/gone").is_none());
        let refs = ledger.get("octo/stays").unwrap();
        assert!(refs.contains(SHA_B), "keep refs survive expiry");
        assert!(refs.contains(SHA_C));
    }

    #[test]
    fn workflow_contains_one_step_per_updatable_ref() {
        let mut ledger = ActionLedger::new();
        let refs = ledger.entry("octo/action");
        refs.insert(SHA_A, detail(Some("v1"), Some(date(2026, 1, 1)), false));
        refs.insert(SHA_B, detail(Some("v2"), None, false));
        ledger
            .entry("octo/other")
            .insert(SHA_C, detail(None, None, false));

        let workflow = generate_workflow(&ledger).unwrap();
        assert!(workflow.contains(&format!("- uses: octo/action@{SHA_B}  # v2")));
        assert!(!workflow.contains(SHA_A), "expiring refs are not updatable");
        assert!(workflow.contains(&format!("- uses: octo/other@{SHA_C}\n")));
        assert!(workflow.contains("        if: false"));
        assert!(workflow.ends_with("      - run: echo Success!\n"));
    }

    #[test]
    fn workflow_rejects_multiple_update_candidates() {
        let mut ledger = ActionLedger::new();
        let refs = ledger.entry("octo/action");
        refs.insert(SHA_A, detail(None, None, false));
        refs.insert(SHA_B, detail(None, None, false));

        let err = generate_workflow(&ledger).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::MultipleUpdateCandidates { ref name } if name == "octo/action"
        ));
    }

    #[test]
    fn workflow_uses_round_trip() {
        let mut ledger = ActionLedger::new();
        ledger
            .entry("octo/action")
            .insert(SHA_A, detail(Some("v5.0.0"), None, false));
        ledger.entry("octo/plain").insert(SHA_B, detail(None, None, false));

        let workflow = generate_workflow(&ledger).unwrap();
        let uses = parse_workflow_uses(&workflow).unwrap();
        assert_eq!(
            uses,
            vec![
                WorkflowUse {
                    name: "octo/action".into(),
                    reference: SHA_A.into(),
                    tag: Some("v5.0.0".into()),
                },
                WorkflowUse {
                    name: "octo/plain".into(),
                    reference: SHA_B.into(),
                    tag: None,
                },
            ]
        );
    }

    #[test]
    fn update_refs_appends_new_ref_with_tag() {
        let mut ledger = ActionLedger::new();
        let uses = vec![WorkflowUse {
            name: "octo/new".into(),
            reference: SHA_A.into(),
            tag: Some("v1.0.0".into()),
        }];

        update_refs(&mut ledger, &uses, date(2026, 1, 1));

        let details = ledger.get("octo/new").unwrap().get(SHA_A).unwrap();
        assert_eq!(details.tag.as_deref(), Some("v1.0.0"));
        assert!(details.expires_at.is_none());
    }

    #[test]
    fn update_refs_clamps_sibling_expiry() {
        let mut ledger = ActionLedger::new();
        let refs = ledger.entry("octo/action");
        refs.insert(SHA_A, detail(Some("v1"), None, false));
        refs.insert(SHA_B, detail(Some("v2"), Some(date(2030, 1, 1)), false));
        refs.insert(SHA_C, detail(None, None, true));

        let uses = vec![WorkflowUse {
            name: "octo/action".into(),
            reference: "aaaabbbbccccddddeeeeffff0000111122223333".into(),
            tag: Some("v3".into()),
        }];
        let today = date(2026, 1, 1);
        update_refs(&mut ledger, &uses, today);

        let clamp = calculate_expiry(today, 12);
        let refs = ledger.get("octo/action").unwrap();
        assert_eq!(refs.get(SHA_A).unwrap().expires_at, Some(clamp));
        assert_eq!(refs.get(SHA_B).unwrap().expires_at, Some(clamp));
        assert!(refs.get(SHA_C).unwrap().expires_at.is_none(), "keep refs untouched");
        assert!(refs.contains("aaaabbbbccccddddeeeeffff0000111122223333"));
    }

    #[test]
    fn update_refs_known_ref_changes_nothing() {
        let mut ledger = ActionLedger::new();
        let refs = ledger.entry("octo/action");
        refs.insert(SHA_A, detail(Some("v1"), None, false));
        refs.insert(SHA_B, detail(Some("v2"), None, false));

        let uses = vec![WorkflowUse {
            name: "octo/action".into(),
            reference: SHA_B.into(),
            tag: Some("v2".into()),
        }];
        let before = ledger.clone();
        update_refs(&mut ledger, &uses, date(2026, 1, 1));
        assert_eq!(ledger, before);
    }

    #[test]
    fn malformed_uses_step_is_an_error() {
        let workflow = "\
    steps:
      - uses: octo/action
        if: false
";
        let err = parse_workflow_uses(workflow).unwrap_err();
        assert!(matches!(err, LedgerError::MalformedUses { ref line } if line.contains("octo/action")));
    }

    #[test]
    fn update_refs_does_not_extend_closer_expiry() {
        let mut ledger = ActionLedger::new();
        ledger
            .entry("octo/action")
            .insert(SHA_A, detail(None, Some(date(2026, 1, 10)), false));

        let uses = vec![WorkflowUse {
            name: "octo/action".into(),
            reference: SHA_B.into(),
            tag: None,
        }];
        update_refs(&mut ledger, &uses, date(2026, 1, 1));

        let refs = ledger.get("octo/action").unwrap();
        assert_eq!(refs.get(SHA_A).unwrap().expires_at, Some(date(2026, 1, 10)));
    }
}
