#![allow(clippy::unwrap_used, clippy::expect_used)]

// Test suite for Digest Core known-answer vectors

use driftx_core::digest::{digest, digest_bytes, DigestAlgorithm, Encoding};

const FOX: &[u8] = b"The quick brown fox jumps over the lazy dog";

#[test]
fn test_fox_vectors_all_algorithms() {
    let cases = [
        (DigestAlgorithm::Crc32, "414fa339"),
        (DigestAlgorithm::Md5, "9e107d9d372bb6826bd81d3542a419d6"),
        (DigestAlgorithm::Sha1, "2fd4e1c67a2d28fced849ee1bb76e7391b93eb12"),
        (
            DigestAlgorithm::Sha256,
            "d7a8fbb307d7809469ca9abcb0082e4f8d5651e46d3cdb762d02d0bf37c9e592",
        ),
        (
            DigestAlgorithm::Sha512,
            "07e547d9586f6a73f73fbac0435ed76951218fb7d0c8d788a309d785436bbb64\
             2e93a252a954f23912547d1e8a3b5ed6e1bfd7097821233fa0538f3db854fee6",
        ),
    ];

    for (algorithm, expected) in cases {
        let result = digest(FOX, algorithm, Encoding::Hex).unwrap();
        assert_eq!(result.to_hex(), expected, "{algorithm}");
        assert_eq!(result.raw_bytes().len(), algorithm.output_len());
    }
}

#[test]
fn test_empty_input_vectors() {
    assert_eq!(
        digest_bytes(b"", DigestAlgorithm::Md5, Encoding::Hex).to_hex(),
        "d41d8cd98f00b204e9800998ecf8427e"
    );
    assert_eq!(
        digest_bytes(b"", DigestAlgorithm::Sha256, Encoding::Hex).to_hex(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        digest_bytes(b"", DigestAlgorithm::Crc32, Encoding::Hex).to_hex(),
        "00000000"
    );
}

#[test]
fn test_crc32_hex_is_zero_padded() {
    // CRC32("hello world") = 0x0d4a1185 has a leading zero nibble
    let result = digest_bytes(b"hello world", DigestAlgorithm::Crc32, Encoding::Hex);
    assert_eq!(result.to_hex(), "0d4a1185");
    assert_eq!(result.raw_bytes(), &[0x0d, 0x4a, 0x11, 0x85]);
}

#[test]
fn test_digest_of_digest_by_chaining() {
    // GIVEN the MD5 of the fox sentence
    let md5 = digest(FOX, DigestAlgorithm::Md5, Encoding::Hex).unwrap();

    // WHEN its hex text is rendered as base64
    let chained = Encoding::Base64.encode(&md5.rendered());

    // THEN it matches the legacy "base64 of md5" fingerprint
    assert_eq!(chained, b"OWUxMDdkOWQzNzJiYjY4MjZiZDgxZDM1NDJhNDE5ZDY=".to_vec());
}

#[test]
fn test_sha256_hello_world() {
    let result = digest_bytes(b"hello world", DigestAlgorithm::Sha256, Encoding::Base64);
    assert_eq!(
        result.to_hex(),
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
    );
    assert_eq!(result.encoding(), Encoding::Base64);
}
