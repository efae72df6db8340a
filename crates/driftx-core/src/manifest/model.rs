use crate::digest::{DigestAlgorithm, DigestResult, Encoding};
use crate::errors::{DriftXError, Result};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caller intent when an id is recorded twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Reject any repeated id
    #[default]
    FailOnDuplicate,
    /// Replace the existing entry in place
    ReplaceExisting,
    /// Keep the existing entry and skip the new one
    MergeNewOnly,
}

impl OverwritePolicy {
    pub fn token(self) -> &'static str {
        match self {
            OverwritePolicy::FailOnDuplicate => "fail_on_duplicate",
            OverwritePolicy::ReplaceExisting => "replace_existing",
            OverwritePolicy::MergeNewOnly => "merge_new_only",
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for OverwritePolicy {
    type Err = DriftXError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fail_on_duplicate" => Ok(OverwritePolicy::FailOnDuplicate),
            "replace_existing" => Ok(OverwritePolicy::ReplaceExisting),
            "merge_new_only" => Ok(OverwritePolicy::MergeNewOnly),
            _ => Err(DriftXError::InvalidInput {
                reason: format!("unknown overwrite policy '{}'", s),
            }),
        }
    }
}

/// Expected fingerprint of one artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    pub algorithm: DigestAlgorithm,
    pub expected_digest: Vec<u8>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ManifestEntry {
    pub fn new(id: impl Into<String>, digest: &DigestResult, recorded_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id: id.into(),
            algorithm: digest.algorithm(),
            expected_digest: digest.raw_bytes().to_vec(),
            recorded_at,
        }
    }

    /// Stored digest as a comparable value
    ///
    /// # Errors
    ///
    /// Returns `DigestLength` if the entry was built with a digest of the
    /// wrong width.
    pub fn expected(&self) -> Result<DigestResult> {
        DigestResult::new(self.algorithm, self.expected_digest.clone(), Encoding::Hex)
    }
}

/// Result of a single `Manifest::insert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Replaced,
    Skipped,
}

/// Ordered mapping from artifact id to expected digest
///
/// Iteration follows first-insertion order; replacing an entry keeps its
/// position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    entries: IndexMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.entries.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Record an entry under the given policy
    ///
    /// # Errors
    ///
    /// - `InvalidId` if the id cannot be stored in the text format
    /// - `DuplicateId` if the id exists and the policy is `FailOnDuplicate`
    pub fn insert(&mut self, entry: ManifestEntry, policy: OverwritePolicy) -> Result<InsertOutcome> {
        validate_id(&entry.id)?;

        if !self.entries.contains_key(&entry.id) {
            self.entries.insert(entry.id.clone(), entry);
            return Ok(InsertOutcome::Inserted);
        }

        match policy {
            OverwritePolicy::FailOnDuplicate => Err(DriftXError::DuplicateId { id: entry.id }),
            OverwritePolicy::ReplaceExisting => {
                // IndexMap::insert keeps the original slot for an existing key
                self.entries.insert(entry.id.clone(), entry);
                Ok(InsertOutcome::Replaced)
            }
            OverwritePolicy::MergeNewOnly => Ok(InsertOutcome::Skipped),
        }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a ManifestEntry;
    type IntoIter = indexmap::map::Values<'a, String, ManifestEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

/// Check that an id can round-trip through the manifest text format
///
/// # Errors
///
/// Returns `InvalidId` for empty ids, ids containing TAB, CR or LF, and ids
/// starting with `#`.
pub fn validate_id(id: &str) -> Result<()> {
    let reason = if id.is_empty() {
        "id must not be empty"
    } else if id.contains(['\t', '\r', '\n']) {
        "id must not contain tab or line break characters"
    } else if id.starts_with('#') {
        "id must not start with '#'"
    } else {
        return Ok(());
    };
    Err(DriftXError::InvalidId {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest_bytes;

    fn entry(id: &str, content: &str) -> ManifestEntry {
        let digest = digest_bytes(content.as_bytes(), DigestAlgorithm::Md5, Encoding::Hex);
        ManifestEntry::new(id, &digest, None)
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut manifest = Manifest::new();
        for id in ["zeta", "alpha", "mid"] {
            manifest.insert(entry(id, id), OverwritePolicy::FailOnDuplicate).unwrap();
        }
        assert_eq!(manifest.ids().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_fail_on_duplicate() {
        let mut manifest = Manifest::new();
        manifest.insert(entry("a", "one"), OverwritePolicy::FailOnDuplicate).unwrap();
        let err = manifest
            .insert(entry("a", "two"), OverwritePolicy::FailOnDuplicate)
            .unwrap_err();
        assert_eq!(err, DriftXError::DuplicateId { id: "a".to_string() });
        assert_eq!(manifest.get("a"), Some(&entry("a", "one")));
    }

    #[test]
    fn test_replace_existing_keeps_position() {
        let mut manifest = Manifest::new();
        manifest.insert(entry("a", "one"), OverwritePolicy::FailOnDuplicate).unwrap();
        manifest.insert(entry("b", "two"), OverwritePolicy::FailOnDuplicate).unwrap();

        let outcome = manifest
            .insert(entry("a", "changed"), OverwritePolicy::ReplaceExisting)
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Replaced);
        assert_eq!(manifest.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(manifest.get("a"), Some(&entry("a", "changed")));
    }

    #[test]
    fn test_merge_new_only_skips_existing() {
        let mut manifest = Manifest::new();
        manifest.insert(entry("a", "one"), OverwritePolicy::FailOnDuplicate).unwrap();
        let outcome = manifest
            .insert(entry("a", "other"), OverwritePolicy::MergeNewOnly)
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Skipped);
        assert_eq!(manifest.get("a"), Some(&entry("a", "one")));
    }

    #[test]
    fn test_invalid_ids_rejected() {
        for bad in ["", "a\tb", "line\nbreak", "cr\r", "#comment"] {
            let mut manifest = Manifest::new();
            let result = manifest.insert(entry(bad, "x"), OverwritePolicy::FailOnDuplicate);
            assert!(matches!(result, Err(DriftXError::InvalidId { .. })), "{bad:?}");
        }
    }

    #[test]
    fn test_policy_tokens() {
        assert_eq!(
            "replace-existing".parse::<OverwritePolicy>().unwrap(),
            OverwritePolicy::ReplaceExisting
        );
        assert_eq!(OverwritePolicy::MergeNewOnly.to_string(), "merge_new_only");
        assert!("overwrite".parse::<OverwritePolicy>().is_err());
    }
}
