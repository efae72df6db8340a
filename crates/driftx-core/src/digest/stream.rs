//! Chunked streaming digest
//!
//! Memory use is bounded by the chunk size regardless of input length. Each
//! call owns its read buffer, so concurrent calls never share one.

use crate::digest::algorithm::DigestAlgorithm;
use crate::digest::encoding::Encoding;
use crate::digest::result::DigestResult;
use crate::digest::wipe;
use crate::errors::{DriftXError, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Default read chunk, 32 KiB
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Tuning knobs for streaming digests
///
/// Neither option affects digest values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    pub chunk_size: usize,
    /// Zero the read buffer once the stream is consumed
    pub scrub_buffer: bool,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            scrub_buffer: false,
        }
    }
}

impl DigestOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_scrub_buffer(mut self, scrub_buffer: bool) -> Self {
        self.scrub_buffer = scrub_buffer;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidInput` when `chunk_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(DriftXError::InvalidInput {
                reason: "chunk_size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Digest a stream with default options
///
/// # Errors
///
/// Returns `SourceRead` if the reader fails before end of stream.
pub fn digest<R: Read>(reader: R, algorithm: DigestAlgorithm, encoding: Encoding) -> Result<DigestResult> {
    digest_with_options(reader, algorithm, encoding, &DigestOptions::default())
}

/// Digest a stream in `options.chunk_size` chunks
///
/// # Errors
///
/// Returns `InvalidInput` for a zero chunk size and `SourceRead` if the
/// reader fails before end of stream. No partial digest is ever returned.
pub fn digest_with_options<R: Read>(
    reader: R,
    algorithm: DigestAlgorithm,
    encoding: Encoding,
    options: &DigestOptions,
) -> Result<DigestResult> {
    digest_labeled(reader, "stream", algorithm, encoding, options)
}

/// Streaming digest that names `origin` in read errors
pub(crate) fn digest_labeled<R: Read>(
    mut reader: R,
    origin: &str,
    algorithm: DigestAlgorithm,
    encoding: Encoding,
    options: &DigestOptions,
) -> Result<DigestResult> {
    options.validate()?;

    let mut buffer = vec![0u8; options.chunk_size];
    let mut hasher = algorithm.hasher();

    let outcome = loop {
        match reader.read(&mut buffer) {
            Ok(0) => break Ok(()),
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };

    if options.scrub_buffer {
        wipe::wipe(&mut buffer);
    }

    outcome.map_err(|e| DriftXError::SourceRead {
        origin: origin.to_string(),
        message: e.to_string(),
    })?;

    Ok(DigestResult::from_hasher_output(
        algorithm,
        hasher.finalize(),
        encoding,
    ))
}

/// Digest an in-memory buffer in a single update
pub fn digest_bytes(bytes: &[u8], algorithm: DigestAlgorithm, encoding: Encoding) -> DigestResult {
    let mut hasher = algorithm.hasher();
    hasher.update(bytes);
    DigestResult::from_hasher_output(algorithm, hasher.finalize(), encoding)
}

/// Digest a file on disk
///
/// # Errors
///
/// Returns `SourceRead` if the file cannot be opened or read.
pub fn digest_file(
    path: &Path,
    algorithm: DigestAlgorithm,
    encoding: Encoding,
    options: &DigestOptions,
) -> Result<DigestResult> {
    let origin = path.display().to_string();
    let file = File::open(path).map_err(|e| DriftXError::SourceRead {
        origin: origin.clone(),
        message: e.to_string(),
    })?;
    digest_labeled(file, &origin, algorithm, encoding, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Yields `good` bytes, then fails
    struct FailingReader {
        good: Vec<u8>,
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
            }
            self.served = true;
            let n = self.good.len().min(buf.len());
            buf[..n].copy_from_slice(&self.good[..n]);
            Ok(n)
        }
    }

    /// Interrupts every other read
    struct InterruptingReader<'a> {
        data: &'a [u8],
        interrupt_next: bool,
    }

    impl Read for InterruptingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt_next = !self.interrupt_next;
            if !self.interrupt_next {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            self.data.read(buf)
        }
    }

    #[test]
    fn test_mid_stream_failure_returns_no_digest() {
        let reader = FailingReader {
            good: b"partial".to_vec(),
            served: false,
        };
        let err = digest(reader, DigestAlgorithm::Sha256, Encoding::Hex).unwrap_err();
        assert!(matches!(err, DriftXError::SourceRead { ref origin, .. } if origin == "stream"));
    }

    #[test]
    fn test_interrupted_reads_are_retried() {
        let reader = InterruptingReader {
            data: b"hello",
            interrupt_next: false,
        };
        let streamed = digest(reader, DigestAlgorithm::Md5, Encoding::Hex).unwrap();
        assert_eq!(streamed.to_hex(), "5d41402abc4b2a76b9719d911017c592");
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let options = DigestOptions::default().with_chunk_size(0);
        let err = digest_with_options(&b"x"[..], DigestAlgorithm::Md5, Encoding::Hex, &options)
            .unwrap_err();
        assert!(matches!(err, DriftXError::InvalidInput { .. }));
    }

    #[test]
    fn test_scrub_does_not_change_digest() {
        let plain = DigestOptions::default();
        let scrubbed = DigestOptions::default().with_scrub_buffer(true);
        let a = digest_with_options(&b"secret"[..], DigestAlgorithm::Sha1, Encoding::Hex, &plain).unwrap();
        let b = digest_with_options(&b"secret"[..], DigestAlgorithm::Sha1, Encoding::Hex, &scrubbed).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_file_is_source_read_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("absent.bin");
        let err = digest_file(&missing, DigestAlgorithm::Md5, Encoding::Hex, &DigestOptions::default())
            .unwrap_err();
        match err {
            DriftXError::SourceRead { origin, .. } => assert!(origin.ends_with("absent.bin")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
