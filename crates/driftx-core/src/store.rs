//! Manifest persistence seam
//!
//! The engine reads and writes manifests only through `ManifestStore`, so
//! the location is an injected resource rather than global state.

use crate::errors::{ExError, ExErrorKind};
use crate::manifest::{parse_manifest, serialize_manifest, Manifest};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

type StoreResult<T> = std::result::Result<T, ExError>;

/// Persisted manifest location
pub trait ManifestStore: Send + Sync {
    /// Location shown in errors and logs
    fn location(&self) -> String;

    /// Load the persisted manifest, or `None` if nothing has been written
    ///
    /// # Errors
    ///
    /// `ManifestParse` / `UnsupportedAlgorithm` for corrupt content, `Io` for
    /// read failures.
    fn load(&self) -> StoreResult<Option<Manifest>>;

    /// Replace the persisted manifest as a single all-or-nothing write
    ///
    /// # Errors
    ///
    /// `Io` or `Persistence` if the write fails; the previous manifest must
    /// then still be intact.
    fn save(&self, manifest: &Manifest) -> StoreResult<()>;

    /// Take the single-writer lock for a generate run
    ///
    /// # Errors
    ///
    /// `Concurrency` if another writer holds the location.
    fn lock(&self) -> StoreResult<StoreLock> {
        Ok(StoreLock::unlocked())
    }
}

/// Guard releasing a store lock on drop
pub struct StoreLock {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl StoreLock {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Guard for stores without locking
    pub fn unlocked() -> Self {
        Self { release: None }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreLock")
            .field("held", &self.release.is_some())
            .finish()
    }
}

/// In-memory store holding the serialized manifest text
///
/// Goes through the same text codec as the filesystem store, so tests see
/// exactly what would be persisted.
#[derive(Debug, Default)]
pub struct MemoryManifestStore {
    text: Mutex<Option<String>>,
    writes: AtomicUsize,
    locked: Arc<AtomicBool>,
}

impl MemoryManifestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with manifest text
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(Some(text.into())),
            ..Self::default()
        }
    }

    /// Current persisted text, if any
    pub fn text(&self) -> Option<String> {
        self.text.lock().ok().and_then(|t| t.clone())
    }

    /// Number of successful saves
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn poisoned(op: &str) -> ExError {
    ExError::new(ExErrorKind::Internal)
        .with_op(op)
        .with_message("memory store mutex poisoned")
}

impl ManifestStore for MemoryManifestStore {
    fn location(&self) -> String {
        "memory".to_string()
    }

    fn load(&self) -> StoreResult<Option<Manifest>> {
        let guard = self.text.lock().map_err(|_| poisoned("load_manifest"))?;
        guard
            .as_deref()
            .map(|text| {
                parse_manifest(text).map_err(|e| {
                    ExError::from(e)
                        .with_op("load_manifest")
                        .with_path(self.location())
                })
            })
            .transpose()
    }

    fn save(&self, manifest: &Manifest) -> StoreResult<()> {
        let mut guard = self.text.lock().map_err(|_| poisoned("save_manifest"))?;
        *guard = Some(serialize_manifest(manifest));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn lock(&self) -> StoreResult<StoreLock> {
        if self
            .locked
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExError::new(ExErrorKind::Concurrency)
                .with_op("lock_manifest")
                .with_path(self.location())
                .with_message("manifest is locked by another writer"));
        }
        let flag = Arc::clone(&self.locked);
        Ok(StoreLock::new(move || flag.store(false, Ordering::SeqCst)))
    }
}
