//! Atomic write primitives
//!
//! Uses temp→rename pattern to ensure no partial writes

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Atomically replace `target_path` with `content`
///
/// The temp file lives in the target's directory so the rename never
/// crosses filesystems. On failure the temp file is removed and any
/// existing target is left as it was.
///
/// ## Errors
///
/// Returns an `Io` error if the directory, temp file or rename fails.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let parent = target_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf);
    if let Some(parent) = &parent {
        fs::create_dir_all(parent).map_err(|e| io_error("create_manifest_dir", e))?;
    }

    let temp_path = temp_path_for(target_path);

    let written = write_synced(&temp_path, content).and_then(|()| {
        fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_manifest_temp", e))
    });

    if written.is_err() {
        fs::remove_file(&temp_path).ok();
        return written;
    }

    if let Some(parent) = &parent {
        sync_dir(parent);
    }
    Ok(())
}

fn temp_path_for(target_path: &Path) -> PathBuf {
    let file_name = target_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "manifest".to_string());
    target_path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()))
}

fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| io_error("write_manifest_temp", e))?;
    file.write_all(content)
        .map_err(|e| io_error("write_manifest_temp", e))?;
    file.sync_all().map_err(|e| io_error("sync_manifest_temp", e))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(handle) = File::open(dir) {
        handle.sync_all().ok();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_files(dir: &Path) -> usize {
        fs::read_dir(dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count()
    }

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("driftx.manifest");

        atomic_write(&target, b"hello").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"hello");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("driftx.manifest");

        atomic_write(&target, b"first").unwrap();
        atomic_write(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("driftx.manifest");

        atomic_write(&target, b"nested").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"nested");
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("driftx.manifest");

        atomic_write(&target, b"clean").unwrap();

        assert_eq!(tmp_files(temp_dir.path()), 0);
    }

    #[test]
    fn test_failed_rename_keeps_target_and_cleans_temp() {
        let temp_dir = TempDir::new().unwrap();
        // A non-empty directory cannot be replaced by a file rename
        let target = temp_dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), b"keep").unwrap();

        assert!(atomic_write(&target, b"content").is_err());

        assert!(target.is_dir());
        assert_eq!(tmp_files(temp_dir.path()), 0);
    }
}
