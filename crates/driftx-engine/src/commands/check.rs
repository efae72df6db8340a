//! Drift check
//!
//! `LOADING_MANIFEST → EVALUATING (per id) → REPORT_READY`. Only a missing
//! or unreadable manifest aborts the run; every per-id problem becomes a
//! status in the report.

#![allow(clippy::result_large_err)]

use crate::cancel::{is_cancelled, CancelToken};
use crate::commands::{cancelled_error, digest_artifact, elapsed_ms, DigestFailure};
use crate::pool::run_ordered;
use driftx_core::digest::{DigestAlgorithm, DigestOptions};
use driftx_core::errors::{DriftXError, ExError};
use driftx_core::manifest::{CheckOutcome, CheckReport, CheckStatus, Manifest};
use driftx_core::source::{Artifact, Collection};
use driftx_core::store::ManifestStore;
use driftx_core::{log_op_end, log_op_error, log_op_start};
use driftx_core_types::RunId;
use driftx_store::errors::Result;
use std::collections::HashSet;
use std::time::Instant;

const OP: &str = "check";

/// Options for a check run.
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// Algorithm the caller expects every entry to use. `None` recomputes
    /// each entry with its stored algorithm.
    pub algorithm: Option<DigestAlgorithm>,
    pub workers: usize,
    pub digest: DigestOptions,
    pub cancel: Option<CancelToken>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            algorithm: None,
            workers: 1,
            digest: DigestOptions::default(),
            cancel: None,
        }
    }
}

impl CheckOptions {
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_digest_options(mut self, digest: DigestOptions) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Compare `collection` against the manifest persisted in `store`
///
/// Outcomes follow collection order; ids only present in the manifest
/// follow in manifest order as `MISSING_SOURCE`. A repeated id in the
/// collection is evaluated once per occurrence.
///
/// ## Errors
///
/// - `ManifestNotFound` if the store holds no manifest
/// - `ManifestParse` / `UnsupportedAlgorithm` if the manifest is corrupt
/// - `Cancelled` if the cancel token fires
pub fn check(
    collection: &Collection,
    store: &dyn ManifestStore,
    options: &CheckOptions,
) -> Result<CheckReport> {
    let run_id = RunId::new();
    log_op_start!(
        OP,
        run_id = %run_id,
        artifact_count = collection.len(),
        manifest = %store.location()
    );
    let start = Instant::now();

    let report = check_impl(collection, store, options, &run_id).map_err(|e| {
        let e = e.with_run_id(run_id.clone());
        log_op_error!(OP, e.clone(), duration_ms = elapsed_ms(start), run_id = %run_id);
        e
    })?;

    let summary = report.summary();
    log_op_end!(
        OP,
        duration_ms = elapsed_ms(start),
        run_id = %run_id,
        passed = report.passed(),
        entry_count = summary.total,
        matched = summary.matched,
        failed = summary.failed()
    );

    Ok(report)
}

fn check_impl(
    collection: &Collection,
    store: &dyn ManifestStore,
    options: &CheckOptions,
    run_id: &RunId,
) -> Result<CheckReport> {
    options
        .digest
        .validate()
        .map_err(|e| ExError::from(e).with_op(OP))?;

    let manifest = store.load()?.ok_or_else(|| {
        ExError::from(DriftXError::ManifestNotFound {
            location: store.location(),
        })
        .with_op(OP)
    })?;

    let cancel = options.cancel.as_ref();
    let statuses = run_ordered(collection.as_slice(), options.workers, |_, artifact| {
        evaluate(artifact, &manifest, options, cancel)
    });

    let mut outcomes = Vec::with_capacity(collection.len() + manifest.len());
    for (artifact, status) in collection.iter().zip(statuses) {
        let status = status?;
        log_outcome(run_id, artifact.id(), &status);
        outcomes.push(CheckOutcome::new(artifact.id(), status));
    }

    let produced: HashSet<&str> = collection.iter().map(Artifact::id).collect();
    for entry in manifest.iter().filter(|e| !produced.contains(e.id.as_str())) {
        let status = CheckStatus::MissingSource { reason: None };
        log_outcome(run_id, &entry.id, &status);
        outcomes.push(CheckOutcome::new(entry.id.clone(), status));
    }

    if is_cancelled(cancel) {
        return Err(cancelled_error(OP));
    }

    Ok(CheckReport::new(outcomes))
}

fn evaluate(
    artifact: &Artifact,
    manifest: &Manifest,
    options: &CheckOptions,
    cancel: Option<&CancelToken>,
) -> Result<CheckStatus> {
    let Some(entry) = manifest.get(artifact.id()) else {
        return Ok(CheckStatus::MissingExpectation);
    };

    if let Some(requested) = options.algorithm {
        if requested != entry.algorithm {
            return Ok(CheckStatus::AlgorithmMismatch {
                stored: entry.algorithm,
                requested,
            });
        }
    }

    let expected = entry.expected().map_err(|e| {
        ExError::from(e)
            .with_op(OP)
            .with_artifact_id(artifact.id())
    })?;

    match digest_artifact(artifact, entry.algorithm, &options.digest, cancel) {
        Ok(actual) if actual == expected => Ok(CheckStatus::Match),
        Ok(actual) => Ok(CheckStatus::Mismatch { expected, actual }),
        Err(DigestFailure::Cancelled) => Err(cancelled_error(OP)),
        Err(DigestFailure::Failed(e)) => Ok(CheckStatus::MissingSource {
            reason: Some(e.to_string()),
        }),
    }
}

fn log_outcome(run_id: &RunId, artifact_id: &str, status: &CheckStatus) {
    if status.is_match() {
        tracing::debug!(run_id = %run_id, artifact_id, status = status.label(), "artifact matches");
    } else {
        tracing::warn!(run_id = %run_id, artifact_id, status = status.label(), "drift detected");
    }
}
