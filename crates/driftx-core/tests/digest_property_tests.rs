//! Property-based tests for the Digest Core
//!
//! ## Properties Verified
//!
//! - Determinism: the same bytes always give the same digest
//! - Chunking invariance: chunk size never changes the digest
//! - Encoding round-trip: hex and base64 decode back to the raw bytes
//! - Sensitivity: a one-byte change changes a cryptographic digest

use driftx_core::digest::{
    digest_bytes, digest_with_options, DigestAlgorithm, DigestOptions, DigestResult, Encoding,
};
use proptest::prelude::*;

fn arb_algorithm() -> impl Strategy<Value = DigestAlgorithm> {
    prop::sample::select(DigestAlgorithm::all().collect::<Vec<_>>())
}

fn streamed(bytes: &[u8], algorithm: DigestAlgorithm, chunk_size: usize) -> DigestResult {
    let options = DigestOptions::default().with_chunk_size(chunk_size);
    digest_with_options(bytes, algorithm, Encoding::Hex, &options).unwrap()
}

proptest! {
    /// Property: digesting is deterministic
    #[test]
    fn prop_digest_deterministic(
        bytes in prop::collection::vec(any::<u8>(), 0..2048),
        algorithm in arb_algorithm()
    ) {
        prop_assert_eq!(
            digest_bytes(&bytes, algorithm, Encoding::Hex),
            digest_bytes(&bytes, algorithm, Encoding::Hex)
        );
    }

    /// Property: 1 byte, 64 KiB and len+1 chunks all equal the whole-buffer digest
    #[test]
    fn prop_chunking_invariant(
        bytes in prop::collection::vec(any::<u8>(), 0..4096),
        algorithm in arb_algorithm()
    ) {
        let whole = digest_bytes(&bytes, algorithm, Encoding::Hex);
        for chunk_size in [1, 64 * 1024, bytes.len() + 1] {
            prop_assert_eq!(&streamed(&bytes, algorithm, chunk_size), &whole);
        }
    }

    /// Property: hex and base64 renderings decode to the raw bytes
    #[test]
    fn prop_encoding_round_trip(
        bytes in prop::collection::vec(any::<u8>(), 0..512),
        algorithm in arb_algorithm()
    ) {
        let result = digest_bytes(&bytes, algorithm, Encoding::Raw);
        for encoding in [Encoding::Hex, Encoding::Base64] {
            let encoded = encoding.encode(result.raw_bytes());
            prop_assert_eq!(encoding.decode(&encoded).unwrap(), result.raw_bytes().to_vec());
            let reparsed = DigestResult::from_encoded(algorithm, &encoded, encoding).unwrap();
            prop_assert_eq!(&reparsed, &result);
        }
    }

    /// Property: flipping one byte changes every cryptographic digest
    #[test]
    fn prop_single_byte_change_detected(
        bytes in prop::collection::vec(any::<u8>(), 1..1024),
        index in any::<prop::sample::Index>()
    ) {
        let mut changed = bytes.clone();
        let i = index.index(changed.len());
        changed[i] = changed[i].wrapping_add(1);

        for algorithm in DigestAlgorithm::all().filter(|a| a.is_cryptographic()) {
            prop_assert_ne!(
                digest_bytes(&bytes, algorithm, Encoding::Hex),
                digest_bytes(&changed, algorithm, Encoding::Hex)
            );
        }
    }
}

#[test]
fn test_large_input_spanning_many_chunks() {
    let bytes: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    let whole = digest_bytes(&bytes, DigestAlgorithm::Sha512, Encoding::Hex);
    assert_eq!(streamed(&bytes, DigestAlgorithm::Sha512, 32 * 1024), whole);
    assert_eq!(streamed(&bytes, DigestAlgorithm::Sha512, 7), whole);
}
