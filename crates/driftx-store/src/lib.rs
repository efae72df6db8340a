//! DriftX Store - filesystem persistence for manifests
//!
//! Provides:
//! - Atomic temp→rename manifest writes
//! - A `<manifest>.lock` single-writer lock for generate runs
//! - `FsManifestStore`, the filesystem `ManifestStore`
//! - The TOML collection config loader

pub mod atomic;
pub mod config;
pub mod errors;
pub mod fs_store;
pub mod lock;

// Re-export key types
pub use config::{ArtifactSpec, DriftConfig};
pub use errors::Result;
pub use fs_store::{FsManifestStore, ManifestFormat};
