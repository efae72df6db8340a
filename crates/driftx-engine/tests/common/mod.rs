use driftx_core::source::{ByteSource, Collection};
use driftx_engine::CancelToken;
use std::io::{self, Read};

/// Collection of in-memory fixtures, in the given order
#[allow(dead_code)]
pub fn texts(items: &[(&str, &str)]) -> Collection {
    items
        .iter()
        .fold(Collection::new(), |collection, (id, text)| {
            collection.with_text(*id, text)
        })
}

/// Source that yields some bytes, then fails
#[allow(dead_code)]
pub struct BrokenSource;

impl ByteSource for BrokenSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        Ok(Box::new(BrokenReader { served: false }))
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

struct BrokenReader {
    served: bool,
}

impl Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "device vanished"));
        }
        self.served = true;
        let n = buf.len().min(4);
        buf[..n].fill(b'x');
        Ok(n)
    }
}

/// Source that cancels the run as soon as it is opened
#[allow(dead_code)]
pub struct CancellingSource(pub CancelToken);

impl ByteSource for CancellingSource {
    fn open(&self) -> io::Result<Box<dyn Read + Send + '_>> {
        self.0.cancel();
        Ok(Box::new(&b"never fully read"[..]))
    }

    fn describe(&self) -> String {
        "cancelling".to_string()
    }
}
