use crate::digest::hasher::{Crc32Hasher, DigestHasher, StreamHasher};
use crate::errors::{DriftXError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported digest algorithms
///
/// Discriminants index into `ALGORITHMS`; keep both in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// CRC-32 (IEEE). Integrity only, not collision resistant.
    Crc32 = 0,
    Md5 = 1,
    Sha1 = 2,
    Sha256 = 3,
    Sha512 = 4,
}

struct AlgorithmInfo {
    algorithm: DigestAlgorithm,
    token: &'static str,
    output_len: usize,
    cryptographic: bool,
    new_hasher: fn() -> Box<dyn StreamHasher>,
}

static ALGORITHMS: [AlgorithmInfo; 5] = [
    AlgorithmInfo {
        algorithm: DigestAlgorithm::Crc32,
        token: "crc32",
        output_len: 4,
        cryptographic: false,
        new_hasher: Crc32Hasher::boxed,
    },
    AlgorithmInfo {
        algorithm: DigestAlgorithm::Md5,
        token: "md5",
        output_len: 16,
        cryptographic: true,
        new_hasher: DigestHasher::<md5::Md5>::boxed,
    },
    AlgorithmInfo {
        algorithm: DigestAlgorithm::Sha1,
        token: "sha1",
        output_len: 20,
        cryptographic: true,
        new_hasher: DigestHasher::<sha1::Sha1>::boxed,
    },
    AlgorithmInfo {
        algorithm: DigestAlgorithm::Sha256,
        token: "sha256",
        output_len: 32,
        cryptographic: true,
        new_hasher: DigestHasher::<sha2::Sha256>::boxed,
    },
    AlgorithmInfo {
        algorithm: DigestAlgorithm::Sha512,
        token: "sha512",
        output_len: 64,
        cryptographic: true,
        new_hasher: DigestHasher::<sha2::Sha512>::boxed,
    },
];

impl DigestAlgorithm {
    fn info(self) -> &'static AlgorithmInfo {
        &ALGORITHMS[self as usize]
    }

    /// All algorithms in declaration order
    pub fn all() -> impl Iterator<Item = DigestAlgorithm> {
        ALGORITHMS.iter().map(|info| info.algorithm)
    }

    /// Canonical lowercase token used in manifests and on the command line
    pub fn token(self) -> &'static str {
        self.info().token
    }

    /// Digest width in bytes
    pub fn output_len(self) -> usize {
        self.info().output_len
    }

    /// False for checksums that only detect accidental corruption
    pub fn is_cryptographic(self) -> bool {
        self.info().cryptographic
    }

    /// Fresh incremental hasher for this algorithm
    pub fn hasher(self) -> Box<dyn StreamHasher> {
        (self.info().new_hasher)()
    }

    /// Reject integrity-only algorithms unless the caller opted in
    ///
    /// # Errors
    ///
    /// Returns `AlgorithmNotPermitted` for a non-cryptographic algorithm when
    /// `allow_non_cryptographic` is false.
    pub fn ensure_permitted(self, allow_non_cryptographic: bool) -> Result<()> {
        if self.is_cryptographic() || allow_non_cryptographic {
            Ok(())
        } else {
            Err(DriftXError::AlgorithmNotPermitted {
                algorithm: self.token().to_string(),
            })
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = DriftXError;

    /// Parse a token case-insensitively; `sha-256` style spellings are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        ALGORITHMS
            .iter()
            .find(|info| info.token == normalized)
            .map(|info| info.algorithm)
            .ok_or_else(|| DriftXError::UnsupportedAlgorithm {
                token: s.to_string(),
            })
    }
}
