//! Manifest generation
//!
//! ## Pipeline (in order):
//! 1. Validate options and artifact ids (no I/O)
//! 2. Duplicate pre-scan under `fail_on_duplicate` (no I/O)
//! 3. Take the store's single-writer lock
//! 4. Load the base manifest for `replace_existing` / `merge_new_only`
//! 5. Digest planned artifacts on the worker pool
//! 6. Insert entries in collection order
//! 7. Single atomic save
//!
//! Any failure before step 7 leaves the persisted manifest untouched.

#![allow(clippy::result_large_err)]

use crate::cancel::{is_cancelled, CancelToken};
use crate::commands::{cancelled_error, digest_artifact, elapsed_ms, DigestFailure};
use crate::pool::run_ordered;
use chrono::{DateTime, Utc};
use driftx_core::digest::{DigestAlgorithm, DigestOptions, DigestResult};
use driftx_core::errors::{DriftXError, ExError};
use driftx_core::manifest::{
    validate_id, InsertOutcome, Manifest, ManifestEntry, OverwritePolicy,
};
use driftx_core::source::Collection;
use driftx_core::store::ManifestStore;
use driftx_core::{log_op_end, log_op_error, log_op_start};
use driftx_core_types::RunId;
use driftx_store::errors::Result;
use std::collections::HashSet;
use std::time::Instant;

const OP: &str = "generate";

/// How `recorded_at` is filled for new or changed entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamping {
    /// Wall clock, read once per run
    Now,
    /// Frozen value, for reproducible manifests
    Fixed(DateTime<Utc>),
    /// Leave `recorded_at` empty
    Omit,
}

impl Timestamping {
    fn resolve(self) -> Option<DateTime<Utc>> {
        match self {
            Timestamping::Now => Some(Utc::now()),
            Timestamping::Fixed(ts) => Some(ts),
            Timestamping::Omit => None,
        }
    }
}

/// Options for a generate run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub algorithm: DigestAlgorithm,
    pub overwrite: OverwritePolicy,
    /// Required to generate with CRC32
    pub allow_non_cryptographic: bool,
    pub workers: usize,
    pub digest: DigestOptions,
    pub timestamps: Timestamping,
    pub cancel: Option<CancelToken>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            algorithm: DigestAlgorithm::Sha256,
            overwrite: OverwritePolicy::FailOnDuplicate,
            allow_non_cryptographic: false,
            workers: 1,
            digest: DigestOptions::default(),
            timestamps: Timestamping::Now,
            cancel: None,
        }
    }
}

impl GenerateOptions {
    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_overwrite(mut self, overwrite: OverwritePolicy) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn allow_non_cryptographic(mut self, allow: bool) -> Self {
        self.allow_non_cryptographic = allow;
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

    pub fn with_timestamps(mut self, timestamps: Timestamping) -> Self {
        self.timestamps = timestamps;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Result of a successful generate run.
#[derive(Debug, Clone)]
pub struct GenerateResult {
    pub run_id: RunId,
    /// The manifest exactly as persisted
    pub manifest: Manifest,
    pub inserted: usize,
    pub replaced: usize,
    /// Artifacts not digested or not recorded under `merge_new_only`
    pub skipped: usize,
}

/// Build a manifest for `collection` and persist it to `store`
///
/// ## Errors
///
/// - `InvalidInput` for invalid ids or options
/// - `AlgorithmNotPermitted` for CRC32 without opt-in
/// - `DuplicateId` under `fail_on_duplicate`
/// - `Concurrency` if another writer holds the store
/// - `SourceRead` if any planned artifact cannot be read
/// - `Cancelled` if the cancel token fires
///
/// No error leaves a partially written manifest.
pub fn generate(
    collection: &Collection,
    store: &dyn ManifestStore,
    options: &GenerateOptions,
) -> Result<GenerateResult> {
    let run_id = RunId::new();
    log_op_start!(
        OP,
        run_id = %run_id,
        artifact_count = collection.len(),
        algorithm = %options.algorithm,
        overwrite = %options.overwrite,
        manifest = %store.location()
    );
    let start = Instant::now();

    let result = generate_impl(collection, store, options, &run_id).map_err(|e| {
        let e = e.with_run_id(run_id.clone());
        log_op_error!(OP, e.clone(), duration_ms = elapsed_ms(start), run_id = %run_id);
        e
    })?;

    log_op_end!(
        OP,
        duration_ms = elapsed_ms(start),
        run_id = %run_id,
        entry_count = result.manifest.len(),
        inserted = result.inserted,
        replaced = result.replaced,
        skipped = result.skipped
    );

    Ok(result)
}

fn generate_impl(
    collection: &Collection,
    store: &dyn ManifestStore,
    options: &GenerateOptions,
    run_id: &RunId,
) -> Result<GenerateResult> {
    options
        .digest
        .validate()
        .map_err(|e| ExError::from(e).with_op(OP))?;
    options
        .algorithm
        .ensure_permitted(options.allow_non_cryptographic)
        .map_err(|e| ExError::from(e).with_op(OP))?;

    for artifact in collection {
        validate_id(artifact.id()).map_err(|e| ExError::from(e).with_op(OP))?;
    }

    if options.overwrite == OverwritePolicy::FailOnDuplicate {
        let mut seen = HashSet::new();
        for artifact in collection {
            if !seen.insert(artifact.id()) {
                return Err(ExError::from(DriftXError::DuplicateId {
                    id: artifact.id().to_string(),
                })
                .with_op(OP));
            }
        }
    }

    let _lock = store.lock()?;

    let mut manifest = match options.overwrite {
        OverwritePolicy::FailOnDuplicate => Manifest::new(),
        OverwritePolicy::ReplaceExisting | OverwritePolicy::MergeNewOnly => {
            store.load()?.unwrap_or_default()
        }
    };

    let planned = plan(collection, &manifest, options.overwrite);
    let cancel = options.cancel.as_ref();

    let digests = run_ordered(collection.as_slice(), options.workers, |index, artifact| {
        if !planned[index] {
            return None;
        }
        let outcome = digest_artifact(artifact, options.algorithm, &options.digest, cancel);
        if let Ok(digest) = &outcome {
            tracing::debug!(
                run_id = %run_id,
                artifact_id = artifact.id(),
                digest = %digest,
                "artifact digested"
            );
        }
        Some(outcome)
    });

    let recorded_at = options.timestamps.resolve();
    let mut result = GenerateResult {
        run_id: run_id.clone(),
        manifest: Manifest::new(),
        inserted: 0,
        replaced: 0,
        skipped: 0,
    };

    for (artifact, digest) in collection.iter().zip(digests) {
        let digest = match digest {
            None => {
                result.skipped += 1;
                continue;
            }
            Some(Ok(digest)) => digest,
            Some(Err(DigestFailure::Cancelled)) => return Err(cancelled_error(OP)),
            Some(Err(DigestFailure::Failed(e))) => {
                return Err(ExError::from(e)
                    .with_op(OP)
                    .with_artifact_id(artifact.id()))
            }
        };

        let entry = entry_for(&manifest, artifact.id(), &digest, recorded_at);
        let outcome = manifest
            .insert(entry, options.overwrite)
            .map_err(|e| ExError::from(e).with_op(OP))?;
        match outcome {
            InsertOutcome::Inserted => result.inserted += 1,
            InsertOutcome::Replaced => result.replaced += 1,
            InsertOutcome::Skipped => result.skipped += 1,
        }
    }

    if is_cancelled(cancel) {
        return Err(cancelled_error(OP));
    }

    store.save(&manifest)?;
    result.manifest = manifest;
    Ok(result)
}

/// Which artifacts need digesting under the policy
fn plan(collection: &Collection, base: &Manifest, policy: OverwritePolicy) -> Vec<bool> {
    match policy {
        OverwritePolicy::MergeNewOnly => {
            let mut seen = HashSet::new();
            collection
                .iter()
                .map(|artifact| !base.contains(artifact.id()) && seen.insert(artifact.id()))
                .collect()
        }
        OverwritePolicy::FailOnDuplicate | OverwritePolicy::ReplaceExisting => {
            vec![true; collection.len()]
        }
    }
}

/// New entry for `id`; an unchanged digest keeps its original timestamp
fn entry_for(
    manifest: &Manifest,
    id: &str,
    digest: &DigestResult,
    recorded_at: Option<DateTime<Utc>>,
) -> ManifestEntry {
    let recorded_at = match manifest.get(id) {
        Some(existing)
            if existing.algorithm == digest.algorithm()
                && existing.expected_digest == digest.raw_bytes() =>
        {
            existing.recorded_at
        }
        _ => recorded_at,
    };
    ManifestEntry::new(id, digest, recorded_at)
}
