//! Error handling for driftx-store
//!
//! Wraps driftx-core ExError with store-specific helpers

use driftx_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a lock-held error
pub fn lock_held(lock_path: &Path) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op("lock_manifest")
        .with_path(lock_path.display().to_string())
        .with_message(format!(
            "Manifest is locked by another writer; remove {} if no other run is active",
            lock_path.display()
        ))
}

/// Create a config validation error
pub fn config_error(path: &Path, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::Config)
        .with_op("load_config")
        .with_path(path.display().to_string())
        .with_message(reason)
}

/// Create a write refusal for read-only manifest formats
pub fn read_only_format(path: &Path) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("save_manifest")
        .with_path(path.display().to_string())
        .with_message("Legacy reference files are read-only; generate a native manifest instead")
}
