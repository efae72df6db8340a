//! Single-writer lock for a manifest location
//!
//! The lock is a sibling `<manifest>.lock` file created with `create_new`,
//! so two generate runs on one location cannot both proceed. Check runs
//! never take it.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, lock_held, Result};
use driftx_core::store::StoreLock;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Lock file path for a manifest path
pub fn lock_path_for(manifest_path: &Path) -> PathBuf {
    let mut name = manifest_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    manifest_path.with_file_name(name)
}

/// Acquire the lock, releasing it when the guard drops
///
/// ## Errors
///
/// `Concurrency` if the lock file exists, `Io` for any other failure.
pub fn acquire(manifest_path: &Path) -> Result<StoreLock> {
    if let Some(parent) = manifest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error("create_manifest_dir", e))?;
    }

    let lock_path = lock_path_for(manifest_path);
    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&lock_path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(lock_held(&lock_path)),
        Err(e) => return Err(io_error("lock_manifest", e)),
    };

    // Owner pid, for humans inspecting a stale lock
    writeln!(file, "{}", std::process::id()).ok();

    tracing::debug!(lock = %lock_path.display(), "manifest lock acquired");
    Ok(StoreLock::new(move || {
        fs::remove_file(&lock_path).ok();
    }))
}
