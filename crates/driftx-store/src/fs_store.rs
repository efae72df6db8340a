//! Filesystem manifest store

#![allow(clippy::result_large_err)]

use crate::atomic::atomic_write;
use crate::errors::{io_error, read_only_format, Result};
use crate::lock;
use driftx_core::errors::{DriftXError, ExError};
use driftx_core::manifest::{import_legacy_csv, parse_manifest, serialize_manifest, Manifest};
use driftx_core::store::{ManifestStore, StoreLock};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// On-disk representation of a manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestFormat {
    /// `# driftx-manifest v1` tab-separated records
    #[default]
    Native,
    /// Read-only `path,md5hex` reference list
    LegacyCsv,
}

/// Manifest stored as a single file
#[derive(Debug, Clone)]
pub struct FsManifestStore {
    path: PathBuf,
    format: ManifestFormat,
}

impl FsManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: ManifestFormat::Native,
        }
    }

    /// Store reading a legacy `path,md5hex` reference file
    pub fn legacy_csv(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: ManifestFormat::LegacyCsv,
        }
    }

    pub fn with_format(mut self, format: ManifestFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ManifestFormat {
        self.format
    }

    fn with_context(&self, err: impl Into<ExError>, op: &str) -> ExError {
        err.into()
            .with_op(op)
            .with_path(self.path.display().to_string())
    }
}

impl ManifestStore for FsManifestStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<Manifest>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.with_context(io_error("load_manifest", e), "load_manifest")),
        };
        let text = decode_utf8(bytes).map_err(|e| self.with_context(e, "load_manifest"))?;

        let parsed = match self.format {
            ManifestFormat::Native => parse_manifest(&text),
            ManifestFormat::LegacyCsv => import_legacy_csv(&text, None),
        };

        parsed
            .map(Some)
            .map_err(|e| self.with_context(e, "load_manifest"))
    }

    fn save(&self, manifest: &Manifest) -> Result<()> {
        if self.format == ManifestFormat::LegacyCsv {
            return Err(read_only_format(&self.path));
        }
        let text = serialize_manifest(manifest);
        atomic_write(&self.path, text.as_bytes()).map_err(|e| self.with_context(e, "save_manifest"))?;
        tracing::debug!(
            manifest = %self.path.display(),
            entries = manifest.len(),
            "manifest written"
        );
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock> {
        lock::acquire(&self.path)
    }
}

/// Manifest text must be UTF-8; the error names the first offending line
fn decode_utf8(bytes: Vec<u8>) -> std::result::Result<String, DriftXError> {
    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        DriftXError::ManifestParse {
            line: valid.iter().filter(|b| **b == b'\n').count() + 1,
            reason: "manifest is not valid UTF-8".to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftx_core::digest::{digest_bytes, DigestAlgorithm, Encoding};
    use driftx_core::errors::ExErrorKind;
    use driftx_core::manifest::{ManifestEntry, OverwritePolicy};
    use tempfile::TempDir;

    fn one_entry() -> Manifest {
        let mut manifest = Manifest::new();
        let digest = digest_bytes(b"hello", DigestAlgorithm::Md5, Encoding::Hex);
        manifest
            .insert(ManifestEntry::new("a", &digest, None), OverwritePolicy::FailOnDuplicate)
            .unwrap();
        manifest
    }

    #[test]
    fn test_missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsManifestStore::new(temp_dir.path().join("absent.manifest"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsManifestStore::new(temp_dir.path().join("driftx.manifest"));

        store.save(&one_entry()).unwrap();

        assert_eq!(store.load().unwrap(), Some(one_entry()));
    }

    #[test]
    fn test_corrupt_file_reports_path_and_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("driftx.manifest");
        fs::write(&path, "# driftx-manifest v1\nbroken\n").unwrap();

        let err = FsManifestStore::new(&path).load().unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ManifestParse);
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.path(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("driftx.manifest");
        fs::write(&path, b"# driftx-manifest v1\na\tmd5\t\xff\xfe\t-\n").unwrap();

        let err = FsManifestStore::new(&path).load().unwrap_err();

        assert_eq!(err.kind(), ExErrorKind::ManifestParse);
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.op(), Some("load_manifest"));
        assert_eq!(err.path(), Some(path.display().to_string().as_str()));
    }

    #[test]
    fn test_legacy_store_loads_and_refuses_writes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("reference.csv");
        fs::write(&path, "a,5d41402abc4b2a76b9719d911017c592\n").unwrap();

        let store = FsManifestStore::legacy_csv(&path);
        assert_eq!(store.load().unwrap(), Some(one_entry()));

        let err = store.save(&one_entry()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "a,5d41402abc4b2a76b9719d911017c592\n"
        );
    }
}
