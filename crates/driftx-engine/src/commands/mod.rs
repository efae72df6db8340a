//! Command orchestration layer.
//!
//! Each public command logs exactly one start event and one end (or
//! end_error) event carrying the run id:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure

pub mod check;
pub mod generate;

use crate::cancel::{is_cancelled, CancelToken, CancellableSource};
use driftx_core::digest::{DigestAlgorithm, DigestOptions, DigestResult, Encoding};
use driftx_core::errors::{DriftXError, ExError, ExErrorKind};
use driftx_core::source::{digest_source, Artifact};
use std::time::Instant;

/// Why an artifact has no digest
pub(crate) enum DigestFailure {
    Cancelled,
    Failed(DriftXError),
}

/// Digest one artifact, observing the cancel token between chunks
pub(crate) fn digest_artifact(
    artifact: &Artifact,
    algorithm: DigestAlgorithm,
    options: &DigestOptions,
    cancel: Option<&CancelToken>,
) -> std::result::Result<DigestResult, DigestFailure> {
    if is_cancelled(cancel) {
        return Err(DigestFailure::Cancelled);
    }

    let digested = match cancel {
        Some(token) => {
            let source = CancellableSource::new(artifact.source(), token.clone());
            digest_source(&source, algorithm, Encoding::Hex, options)
        }
        None => digest_source(artifact.source(), algorithm, Encoding::Hex, options),
    };

    digested.map_err(|e| {
        if is_cancelled(cancel) {
            DigestFailure::Cancelled
        } else {
            DigestFailure::Failed(e)
        }
    })
}

pub(crate) fn cancelled_error(op: &str) -> ExError {
    ExError::new(ExErrorKind::Cancelled)
        .with_op(op)
        .with_message("Run cancelled before completion; nothing was written")
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
