//! Core types for the actions ledger.
//!
//! The ledger is an ordered mapping from action names (`OWNER/REPO[/PATH]`,
//! `OWNER/*`, or `docker://...`) to the set of references pinned for that
//! action. Entry order is document order and is significant: verification
//! output and warning deduplication are defined in terms of it, so both maps
//! are backed by a `Vec` rather than a hash structure.

use std::fmt;

use chrono::NaiveDate;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Metadata attached to a single pinned reference.
///
/// All fields are optional in the document; a ref with no body (`<sha>:`)
/// deserializes to the default.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefDetails {
    /// After this date the reference is considered expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<NaiveDate>,

    /// Retain the reference regardless of expiry; never auto-update it.
    #[serde(default, skip_serializing_if = "is_false")]
    pub keep: bool,

    /// Tag name asserted to correspond to the pinned commit SHA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Downgrade API-level fetch failures for this ref to warnings.
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_gh_api_errors: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl RefDetails {
    /// Returns `true` if no field is set, so the ref serializes as a bare key.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns `true` if the ref is expired as of `today`.
    ///
    /// Expiry is strict: a ref expiring today is still live for verification.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        matches!(self.expires_at, Some(expires) if expires < today)
    }
}

/// Insertion-ordered map from reference token to [`RefDetails`].
///
/// A reference token is either a commit SHA (lowercase hex, at least 7
/// characters, conventionally 40) or the literal wildcard `*`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionRefs {
    entries: Vec<(String, RefDetails)>,
}

impl ActionRefs {
    /// Create an empty ref map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the details for a reference token.
    pub fn get(&self, reference: &str) -> Option<&RefDetails> {
        self.entries
            .iter()
            .find(|(r, _)| r == reference)
            .map(|(_, d)| d)
    }

    /// Returns `true` if the map contains the given reference token.
    pub fn contains(&self, reference: &str) -> bool {
        self.get(reference).is_some()
    }

    /// Insert a reference. An existing entry keeps its position; a new one
    /// is appended at the end.
    pub fn insert(&mut self, reference: impl Into<String>, details: RefDetails) {
        let reference = reference.into();
        match self.entries.iter_mut().find(|(r, _)| *r == reference) {
            Some((_, d)) => *d = details,
            None => self.entries.push((reference, details)),
        }
    }

    /// Remove a reference, returning its details if it was present.
    pub fn remove(&mut self, reference: &str) -> Option<RefDetails> {
        let idx = self.entries.iter().position(|(r, _)| r == reference)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over `(reference, details)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RefDetails)> {
        self.entries.iter().map(|(r, d)| (r.as_str(), d))
    }

    /// Iterate with mutable access to the details.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut RefDetails)> {
        self.entries.iter_mut().map(|(r, d)| (r.as_str(), d))
    }

    /// Number of references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no references.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, RefDetails)> for ActionRefs {
    fn from_iter<I: IntoIterator<Item = (String, RefDetails)>>(iter: I) -> Self {
        let mut refs = Self::new();
        for (reference, details) in iter {
            refs.insert(reference, details);
        }
        refs
    }
}

/// Insertion-ordered map from action name to [`ActionRefs`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionLedger {
    entries: Vec<(String, ActionRefs)>,
}

impl ActionLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the refs for an action name.
    pub fn get(&self, name: &str) -> Option<&ActionRefs> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// Mutable lookup.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ActionRefs> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, r)| r)
    }

    /// Returns `true` if the ledger contains the given action.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert an action. An existing entry keeps its position; a new one is
    /// appended at the end.
    pub fn insert(&mut self, name: impl Into<String>, refs: ActionRefs) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, r)) => *r = refs,
            None => self.entries.push((name, refs)),
        }
    }

    /// Fetch the refs for an action, inserting an empty map if absent.
    pub fn entry(&mut self, name: &str) -> &mut ActionRefs {
        if !self.contains(name) {
            self.entries.push((name.to_string(), ActionRefs::new()));
        }
        self.get_mut(name).unwrap()
    }

    /// Remove an action, returning its refs if it was present.
    pub fn remove(&mut self, name: &str) -> Option<ActionRefs> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over `(name, refs)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ActionRefs)> {
        self.entries.iter().map(|(n, r)| (n.as_str(), r))
    }

    /// Iterate with mutable access to the refs.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ActionRefs)> {
        self.entries.iter_mut().map(|(n, r)| (n.as_str(), r))
    }

    /// Drop every action whose predicate returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &ActionRefs) -> bool) {
        self.entries.retain(|(n, r)| keep(n, r));
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no actions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ActionRefs)> for ActionLedger {
    fn from_iter<I: IntoIterator<Item = (String, ActionRefs)>>(iter: I) -> Self {
        let mut ledger = Self::new();
        for (name, refs) in iter {
            ledger.insert(name, refs);
        }
        ledger
    }
}

// Serde goes through explicit map visitors so entry order survives the
// round trip. A ref or action with a `null` body deserializes to the empty
// value and serializes back to a bare key.

impl Serialize for ActionRefs {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (reference, details) in &self.entries {
            if details.is_empty() {
                map.serialize_entry(reference, &None::<RefDetails>)?;
            } else {
                map.serialize_entry(reference, details)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActionRefs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RefsVisitor;

        impl<'de> Visitor<'de> for RefsVisitor {
            type Value = ActionRefs;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of reference tokens to details")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut refs = ActionRefs::new();
                while let Some((reference, details)) =
                    access.next_entry::<String, Option<RefDetails>>()?
                {
                    refs.insert(reference, details.unwrap_or_default());
                }
                Ok(refs)
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(ActionRefs::new())
            }
        }

        deserializer.deserialize_any(RefsVisitor)
    }
}

impl Serialize for ActionLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, refs) in &self.entries {
            if refs.is_empty() {
                map.serialize_entry(name, &None::<ActionRefs>)?;
            } else {
                map.serialize_entry(name, refs)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ActionLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct LedgerVisitor;

        impl<'de> Visitor<'de> for LedgerVisitor {
            type Value = ActionLedger;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of action names to reference maps")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut ledger = ActionLedger::new();
                while let Some((name, refs)) =
                    access.next_entry::<String, Option<ActionRefs>>()?
                {
                    ledger.insert(name, refs.unwrap_or_default());
                }
                Ok(ledger)
            }
        }

        deserializer.deserialize_map(LedgerVisitor)
    }
}
