//! DriftX Engine - generate and check orchestration
//!
//! Coordinates byte sources, the Digest Core and a `ManifestStore`:
//! - `generate` builds a manifest in memory and writes it once
//! - `check` recomputes digests and returns a `CheckReport`
//!
//! Per-artifact work may run on a bounded worker pool; results are always
//! merged back in collection order.

pub mod cancel;
pub mod commands;
pub mod pool;

pub use cancel::CancelToken;
pub use commands::check::{check, CheckOptions};
pub use commands::generate::{generate, GenerateOptions, GenerateResult, Timestamping};
