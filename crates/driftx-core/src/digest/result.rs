use crate::digest::algorithm::DigestAlgorithm;
use crate::digest::encoding::Encoding;
use crate::errors::{DriftXError, Result};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Immutable digest value
///
/// Equality and hashing consider only the algorithm and raw bytes; the
/// encoding is a rendering preference.
#[derive(Debug, Clone)]
pub struct DigestResult {
    algorithm: DigestAlgorithm,
    raw_bytes: Vec<u8>,
    encoding: Encoding,
}

impl DigestResult {
    /// Build a result from raw bytes, checking the width against the algorithm
    ///
    /// # Errors
    ///
    /// Returns `DigestLength` if `raw_bytes` is not `algorithm.output_len()` long.
    pub fn new(algorithm: DigestAlgorithm, raw_bytes: Vec<u8>, encoding: Encoding) -> Result<Self> {
        if raw_bytes.len() != algorithm.output_len() {
            return Err(DriftXError::DigestLength {
                algorithm: algorithm.token().to_string(),
                expected: algorithm.output_len(),
                actual: raw_bytes.len(),
            });
        }
        Ok(Self {
            algorithm,
            raw_bytes,
            encoding,
        })
    }

    /// Wrap hasher output, whose width is fixed by the algorithm table
    pub(crate) fn from_hasher_output(
        algorithm: DigestAlgorithm,
        raw_bytes: Vec<u8>,
        encoding: Encoding,
    ) -> Self {
        debug_assert_eq!(raw_bytes.len(), algorithm.output_len());
        Self {
            algorithm,
            raw_bytes,
            encoding,
        }
    }

    /// Decode an encoded digest
    ///
    /// # Errors
    ///
    /// Returns `InvalidEncoding` for malformed input and `DigestLength` if the
    /// decoded width does not match the algorithm.
    pub fn from_encoded(
        algorithm: DigestAlgorithm,
        encoded: &[u8],
        encoding: Encoding,
    ) -> Result<Self> {
        let raw = encoding.decode(encoded)?;
        Self::new(algorithm, raw, encoding)
    }

    pub fn from_hex(algorithm: DigestAlgorithm, hex: &str) -> Result<Self> {
        Self::from_encoded(algorithm, hex.as_bytes(), Encoding::Hex)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn into_raw_bytes(self) -> Vec<u8> {
        self.raw_bytes
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Same digest, different presentation
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Bytes in the preferred encoding
    pub fn rendered(&self) -> Vec<u8> {
        self.encoding.encode(&self.raw_bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.raw_bytes)
    }

    pub fn to_base64(&self) -> String {
        String::from_utf8_lossy(&Encoding::Base64.encode(&self.raw_bytes)).into_owned()
    }

    /// CRC32 value as an integer; `None` for every other algorithm
    pub fn as_u32(&self) -> Option<u32> {
        match (self.algorithm, <[u8; 4]>::try_from(self.raw_bytes.as_slice())) {
            (DigestAlgorithm::Crc32, Ok(bytes)) => Some(u32::from_be_bytes(bytes)),
            _ => None,
        }
    }

    /// Leading `len` characters of the displayed form, for short labels
    pub fn truncated(&self, len: usize) -> String {
        self.to_string().chars().take(len).collect()
    }
}

impl PartialEq for DigestResult {
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm && self.raw_bytes == other.raw_bytes
    }
}

impl Eq for DigestResult {}

impl Hash for DigestResult {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.algorithm.hash(state);
        self.raw_bytes.hash(state);
    }
}

/// Raw results display as hex, since raw bytes are not printable.
impl fmt::Display for DigestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encoding {
            Encoding::Base64 => f.write_str(&self.to_base64()),
            Encoding::Raw | Encoding::Hex => f.write_str(&self.to_hex()),
        }
    }
}

impl Serialize for DigestResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DigestResult", 2)?;
        state.serialize_field("algorithm", &self.algorithm)?;
        state.serialize_field("digest", &self.to_hex())?;
        state.end()
    }
}
