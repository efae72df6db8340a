//! Buffer fill and scrub
//!
//! Best-effort hygiene for exclusively owned buffers. `wipe` goes through
//! `zeroize`, which resists the compiler eliding the writes, but neither
//! function claims to remove copies the allocator or OS may have made.

use crate::errors::{DriftXError, Result};
use zeroize::Zeroize;

/// Set the first `len` bytes of `buf` to `value`
///
/// # Errors
///
/// Returns `InvalidInput` if `len` exceeds the buffer length; the buffer is
/// left untouched in that case.
pub fn fill(buf: &mut [u8], value: u8, len: usize) -> Result<()> {
    if len > buf.len() {
        return Err(DriftXError::InvalidInput {
            reason: format!("fill length {} exceeds buffer length {}", len, buf.len()),
        });
    }
    buf[..len].fill(value);
    Ok(())
}

/// Zero the whole buffer
pub fn wipe(buf: &mut [u8]) {
    buf.zeroize();
}
