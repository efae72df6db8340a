//! Manifest model, persisted text format and check report
//!
//! ## Responsibilities
//!
//! - Ordered id → expected digest mapping with explicit overwrite policies
//! - Lossless text codec for the persisted manifest
//! - Per-id check outcomes and overall verdict
//!
//! ## Non-Responsibilities
//!
//! - Where the manifest text lives (see `store`)
//! - Running generate/check over a collection (engine crate)

pub mod format;
pub mod model;
pub mod report;

pub use format::{import_legacy_csv, parse_manifest, serialize_manifest, MANIFEST_HEADER};
pub use model::{validate_id, InsertOutcome, Manifest, ManifestEntry, OverwritePolicy};
pub use report::{CheckOutcome, CheckReport, CheckStatus, CheckSummary};
