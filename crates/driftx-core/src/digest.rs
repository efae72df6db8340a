//! Digest core
//!
//! ## Responsibilities
//!
//! - Closed set of digest algorithms with fixed output widths
//! - Chunked streaming digest over any `Read`
//! - Digest values with raw/hex/base64 rendering
//! - Buffer fill and scrub helpers
//!
//! ## Non-Responsibilities
//!
//! - Knowing where bytes come from (see `source`)
//! - Persisting digests (see `manifest`)

pub mod algorithm;
pub mod encoding;
pub mod hasher;
pub mod result;
pub mod stream;
pub mod wipe;

pub use algorithm::DigestAlgorithm;
pub use encoding::Encoding;
pub use hasher::StreamHasher;
pub use result::DigestResult;
pub use stream::{digest, digest_bytes, digest_file, digest_with_options, DigestOptions};
