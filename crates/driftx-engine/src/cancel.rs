//! Cooperative cancellation
//!
//! Cancelling abandons in-flight digests at the next chunk boundary. Nothing
//! is written after cancellation, so abandoning a run is always safe.

use driftx_core::source::ByteSource;
use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked between artifacts and between chunks
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// True if a token was supplied and has been cancelled
pub(crate) fn is_cancelled(token: Option<&CancelToken>) -> bool {
    token.is_some_and(CancelToken::is_cancelled)
}

/// Source wrapper whose stream fails once the token is cancelled
pub(crate) struct CancellableSource<'a> {
    inner: &'a dyn ByteSource,
    token: CancelToken,
}

impl<'a> CancellableSource<'a> {
    pub(crate) fn new(inner: &'a dyn ByteSource, token: CancelToken) -> Self {
        Self { inner, token }
    }
}

impl ByteSource for CancellableSource<'_> {
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        let reader = self.inner.open()?;
        Ok(Box::new(CancellableReader {
            inner: reader,
            token: self.token.clone(),
        }))
    }

    fn describe(&self) -> String {
        self.inner.describe()
    }
}

struct CancellableReader<R> {
    inner: R,
    token: CancelToken,
}

impl<R: Read> Read for CancellableReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.token.is_cancelled() {
            return Err(io::Error::other("run cancelled"));
        }
        self.inner.read(buf)
    }
}
