use crate::errors::{DriftXError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Presentation of digest bytes
///
/// `Hex` is lowercase with no separators. `Base64` is the standard alphabet
/// with padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Raw,
    #[default]
    Hex,
    Base64,
}

impl Encoding {
    pub fn token(self) -> &'static str {
        match self {
            Encoding::Raw => "raw",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }

    /// Render raw bytes in this encoding
    pub fn encode(self, raw: &[u8]) -> Vec<u8> {
        match self {
            Encoding::Raw => raw.to_vec(),
            Encoding::Hex => hex::encode(raw).into_bytes(),
            Encoding::Base64 => STANDARD.encode(raw).into_bytes(),
        }
    }

    /// Decode bytes produced by `encode` back to raw bytes
    ///
    /// # Errors
    ///
    /// Returns `InvalidEncoding` if the input is not valid for this encoding.
    pub fn decode(self, encoded: &[u8]) -> Result<Vec<u8>> {
        match self {
            Encoding::Raw => Ok(encoded.to_vec()),
            Encoding::Hex => hex::decode(encoded).map_err(|e| DriftXError::InvalidEncoding {
                encoding: self.token().to_string(),
                reason: e.to_string(),
            }),
            Encoding::Base64 => STANDARD
                .decode(encoded)
                .map_err(|e| DriftXError::InvalidEncoding {
                    encoding: self.token().to_string(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Encoding {
    type Err = DriftXError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(Encoding::Raw),
            "hex" => Ok(Encoding::Hex),
            "base64" | "b64" => Ok(Encoding::Base64),
            _ => Err(DriftXError::InvalidInput {
                reason: format!("unknown encoding '{}'", s),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_lowercase_without_separators() {
        assert_eq!(Encoding::Hex.encode(&[0xAB, 0x01, 0xFF]), b"ab01ff".to_vec());
    }

    #[test]
    fn test_base64_is_padded_standard_alphabet() {
        assert_eq!(Encoding::Base64.encode(&[0xFB, 0xFF]), b"+/8=".to_vec());
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            Encoding::Hex.decode(b"abc"),
            Err(DriftXError::InvalidEncoding { .. })
        ));
        assert!(matches!(
            Encoding::Base64.decode(b"-_8"),
            Err(DriftXError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn test_parse_encoding() {
        assert_eq!("HEX".parse::<Encoding>().unwrap(), Encoding::Hex);
        assert_eq!("b64".parse::<Encoding>().unwrap(), Encoding::Base64);
        assert!("base32".parse::<Encoding>().is_err());
    }
}
