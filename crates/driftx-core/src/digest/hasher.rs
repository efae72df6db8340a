//! Incremental hasher abstraction over the RustCrypto and crc32fast crates

use sha2::Digest;

/// Incremental hasher fed chunk by chunk
pub trait StreamHasher: Send {
    fn update(&mut self, data: &[u8]);

    /// Consume the hasher and return the raw digest bytes
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

/// Adapter for any RustCrypto `Digest` implementation
pub struct DigestHasher<D>(D);

impl<D: Digest + Send + 'static> DigestHasher<D> {
    pub fn new() -> Self {
        Self(D::new())
    }

    pub fn boxed() -> Box<dyn StreamHasher> {
        Box::new(Self::new())
    }
}

impl<D: Digest + Send + 'static> Default for DigestHasher<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Digest + Send> StreamHasher for DigestHasher<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_vec()
    }
}

/// CRC-32 (IEEE) emitted as 4 big-endian bytes
#[derive(Default)]
pub struct Crc32Hasher(crc32fast::Hasher);

impl Crc32Hasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed() -> Box<dyn StreamHasher> {
        Box::new(Self::new())
    }
}

impl StreamHasher for Crc32Hasher {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().to_be_bytes().to_vec()
    }
}
