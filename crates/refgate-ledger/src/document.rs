//! Loading and storing the ledger document.
//!
//! The on-disk format is YAML, hand-edited and commented by maintainers.
//! Comments are tolerated on load (the parser drops them); this module never
//! promises to re-emit them.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::types::ActionLedger;

impl ActionLedger {
    /// Parse a ledger from YAML text.
    ///
    /// An empty document yields an empty ledger.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a ledger from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading actions ledger");
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Serialize the ledger to YAML text, preserving entry order.
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write the ledger to a YAML file.
    ///
    /// This overwrites the file; hand-written comments are lost.
    pub fn store(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "writing actions ledger");
        fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::types::{ActionLedger, RefDetails};

    const SAMPLE: &str = "\
# pinned third-party actions
actions/checkout:
  08c6903cd8c0fde910a37f88322edcfb5dd907a8:
    tag: v5.0.0
sbt/setup-sbt:
  '*':
    expires_at: 2026-02-28
  3e125ece5c3e5248e18da9ed8d2cce3d335ec8dd:
    tag: v1.1.14
    keep: true
some-owner/*:
docker://ghcr.io/some/image:
";

    #[test]
    fn parses_names_in_document_order() {
        let ledger = ActionLedger::from_yaml_str(SAMPLE).unwrap();
        let names: Vec<&str> = ledger.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "actions/checkout",
                "sbt/setup-sbt",
                "some-owner/*",
                "docker://ghcr.io/some/image",
            ]
        );
    }

    #[test]
    fn parses_ref_details() {
        let ledger = ActionLedger::from_yaml_str(SAMPLE).unwrap();
        let refs = ledger.get("sbt/setup-sbt").unwrap();

        let wildcard = refs.get("*").unwrap();
        assert_eq!(
            wildcard.expires_at,
            Some(NaiveDate::from_ymd_opt(2026, 2, 28).unwrap())
        );
        assert!(!wildcard.keep);

        let pinned = refs.get("3e125ece5c3e5248e18da9ed8d2cce3d335ec8dd").unwrap();
        assert_eq!(pinned.tag.as_deref(), Some("v1.1.14"));
        assert!(pinned.keep);
    }

    #[test]
    fn null_bodies_become_empty_maps() {
        let ledger = ActionLedger::from_yaml_str(SAMPLE).unwrap();
        assert!(ledger.get("some-owner/*").unwrap().is_empty());
        assert!(ledger.get("docker://ghcr.io/some/image").unwrap().is_empty());
    }

    #[test]
    fn unknown_detail_keys_are_tolerated() {
        let text = "\
actions/checkout:
  08c6903cd8c0fde910a37f88322edcfb5dd907a8:
    tag: v5.0.0
    reviewed_by: someone
";
        let ledger = ActionLedger::from_yaml_str(text).unwrap();
        let details = ledger
            .get("actions/checkout")
            .unwrap()
            .get("08c6903cd8c0fde910a37f88322edcfb5dd907a8")
            .unwrap();
        assert_eq!(details.tag.as_deref(), Some("v5.0.0"));
    }

    #[test]
    fn empty_document_is_empty_ledger() {
        let ledger = ActionLedger::from_yaml_str("").unwrap();
        assert!(ledger.is_empty());
        let ledger = ActionLedger::from_yaml_str("# only a comment\n").unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn round_trip_preserves_order_and_details() {
        let ledger = ActionLedger::from_yaml_str(SAMPLE).unwrap();
        let emitted = ledger.to_yaml_string().unwrap();
        let reparsed = ActionLedger::from_yaml_str(&emitted).unwrap();
        assert_eq!(ledger, reparsed);

        let names: Vec<&str> = reparsed.iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "actions/checkout",
                "sbt/setup-sbt",
                "some-owner/*",
                "docker://ghcr.io/some/image",
            ]
        );
    }

    #[test]
    fn load_and_store_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actions.yml");
        std::fs::write(&path, SAMPLE).unwrap();

        let ledger = ActionLedger::load(&path).unwrap();
        assert_eq!(ledger.len(), 4);

        let out = dir.path().join("out.yml");
        ledger.store(&out).unwrap();
        let reloaded = ActionLedger::load(&out).unwrap();
        assert_eq!(ledger, reloaded);
    }

    #[test]
    fn empty_details_serialize_as_bare_keys() {
        let mut ledger = ActionLedger::new();
        ledger
            .entry("octo/action")
            .insert("0123456789abcdef0123456789abcdef01234567", RefDetails::default());
        let text = ledger.to_yaml_string().unwrap();
        assert!(text.contains("0123456789abcdef0123456789abcdef01234567: null"));
        assert!(!text.contains("expires_at"));
        assert!(!text.contains("keep"));
    }
}
