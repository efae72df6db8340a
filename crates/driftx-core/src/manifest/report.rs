use crate::digest::{DigestAlgorithm, DigestResult};
use serde::Serialize;

/// Per-id outcome of a check run
///
/// These are expected outcomes surfaced as data, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    Match,
    Mismatch {
        expected: DigestResult,
        actual: DigestResult,
    },
    /// Recorded in the manifest, but the source is absent or unreadable
    MissingSource {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Produced by the collection, but not recorded in the manifest
    MissingExpectation,
    /// Stored algorithm differs from the algorithm the check pinned
    AlgorithmMismatch {
        stored: DigestAlgorithm,
        requested: DigestAlgorithm,
    },
}

impl CheckStatus {
    pub fn is_match(&self) -> bool {
        matches!(self, CheckStatus::Match)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CheckStatus::Match => "MATCH",
            CheckStatus::Mismatch { .. } => "MISMATCH",
            CheckStatus::MissingSource { .. } => "MISSING_SOURCE",
            CheckStatus::MissingExpectation => "MISSING_EXPECTATION",
            CheckStatus::AlgorithmMismatch { .. } => "ALGORITHM_MISMATCH",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub id: String,
    #[serde(flatten)]
    pub status: CheckStatus,
}

impl CheckOutcome {
    pub fn new(id: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            id: id.into(),
            status,
        }
    }
}

/// Counts per status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CheckSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub missing_source: usize,
    pub missing_expectation: usize,
    pub algorithm_mismatch: usize,
}

impl CheckSummary {
    pub fn failed(&self) -> usize {
        self.total - self.matched
    }
}

/// Ordered outcomes of one check run
///
/// Order is collection order, followed by manifest-only ids in manifest
/// order. The run passes iff every outcome is `MATCH`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CheckReport {
    outcomes: Vec<CheckOutcome>,
}

impl CheckReport {
    pub fn new(outcomes: Vec<CheckOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// First outcome recorded for `id`
    pub fn get(&self, id: &str) -> Option<&CheckStatus> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.id == id)
            .map(|outcome| &outcome.status)
    }

    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.status.is_match())
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes
            .iter()
            .filter(|outcome| !outcome.status.is_match())
    }

    pub fn summary(&self) -> CheckSummary {
        let mut summary = CheckSummary {
            total: self.outcomes.len(),
            ..CheckSummary::default()
        };
        for outcome in &self.outcomes {
            match outcome.status {
                CheckStatus::Match => summary.matched += 1,
                CheckStatus::Mismatch { .. } => summary.mismatched += 1,
                CheckStatus::MissingSource { .. } => summary.missing_source += 1,
                CheckStatus::MissingExpectation => summary.missing_expectation += 1,
                CheckStatus::AlgorithmMismatch { .. } => summary.algorithm_mismatch += 1,
            }
        }
        summary
    }
}
