//! DriftX Core - digests, manifests and check reports
//!
//! This crate provides:
//! - The error and logging facilities shared by every driftx crate
//! - The Digest Core: streaming digests over a closed set of algorithms
//! - The Manifest model, its text format and the check report types
//! - Byte sources and the `ManifestStore` persistence seam
//!
//! Nothing here spawns threads or touches a manifest location directly;
//! orchestration lives in `driftx-engine`, filesystem persistence in
//! `driftx-store`.

pub mod digest;
pub mod errors;
pub mod logging_facility;
pub mod manifest;
pub mod source;
pub mod store;

#[doc(hidden)]
pub use driftx_core_types;

// Re-export commonly used types
pub use digest::{DigestAlgorithm, DigestOptions, DigestResult, Encoding};
pub use errors::{DriftXError, ExError, ExErrorKind, Result};
pub use manifest::{
    CheckOutcome, CheckReport, CheckStatus, CheckSummary, Manifest, ManifestEntry,
    OverwritePolicy,
};
pub use source::{Artifact, ByteSource, Collection, CommandSource, FileSource, MemorySource};
pub use store::{ManifestStore, MemoryManifestStore, StoreLock};
