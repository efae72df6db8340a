#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Overwrite policies, algorithm opt-in, source failures, locking and
//! cancellation for `generate`

mod common;

use chrono::{TimeZone, Utc};
use common::{texts, BrokenSource, CancellingSource};
use driftx_core::digest::DigestAlgorithm;
use driftx_core::errors::ExErrorKind;
use driftx_core::manifest::{serialize_manifest, OverwritePolicy};
use driftx_core::source::Collection;
use driftx_core::store::{ManifestStore, MemoryManifestStore};
use driftx_engine::{generate, CancelToken, GenerateOptions, Timestamping};

fn options(policy: OverwritePolicy) -> GenerateOptions {
    GenerateOptions::default()
        .with_algorithm(DigestAlgorithm::Md5)
        .with_overwrite(policy)
        .with_timestamps(Timestamping::Omit)
}

fn seeded_store() -> MemoryManifestStore {
    let store = MemoryManifestStore::new();
    generate(
        &texts(&[("a", "hello"), ("b", "world")]),
        &store,
        &options(OverwritePolicy::FailOnDuplicate),
    )
    .unwrap();
    store
}

fn hex_of(store: &MemoryManifestStore, id: &str) -> String {
    let manifest = store.load().unwrap().unwrap();
    hex::encode(&manifest.get(id).unwrap().expected_digest)
}

#[test]
fn test_fail_on_duplicate_regenerates_from_scratch() {
    let store = seeded_store();

    generate(&texts(&[("c", "new")]), &store, &options(OverwritePolicy::FailOnDuplicate)).unwrap();

    let manifest = store.load().unwrap().unwrap();
    assert_eq!(manifest.ids().collect::<Vec<_>>(), vec!["c"]);
}

#[test]
fn test_replace_existing_updates_in_place_and_appends() {
    // GIVEN a manifest with a, b
    let store = seeded_store();

    // WHEN regenerating b with new content plus a new id c
    let result = generate(
        &texts(&[("c", "new"), ("b", "WORLD")]),
        &store,
        &options(OverwritePolicy::ReplaceExisting),
    )
    .unwrap();

    // THEN a is kept, b is replaced in place, c is appended
    assert_eq!(result.manifest.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(hex_of(&store, "a"), "5d41402abc4b2a76b9719d911017c592");
    assert_eq!(hex_of(&store, "b"), "5289492cf082446ca4a6eec9f72f1ec3");
    assert_eq!((result.inserted, result.replaced), (1, 1));
}

#[test]
fn test_replace_existing_later_duplicate_wins() {
    let store = MemoryManifestStore::new();

    generate(
        &texts(&[("a", "first"), ("a", "hello")]),
        &store,
        &options(OverwritePolicy::ReplaceExisting),
    )
    .unwrap();

    assert_eq!(hex_of(&store, "a"), "5d41402abc4b2a76b9719d911017c592");
}

#[test]
fn test_merge_new_only_keeps_existing_entries() {
    let store = seeded_store();

    let result = generate(
        &texts(&[("b", "CHANGED"), ("c", "world"), ("c", "ignored")]),
        &store,
        &options(OverwritePolicy::MergeNewOnly),
    )
    .unwrap();

    assert_eq!(result.manifest.ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    assert_eq!(hex_of(&store, "b"), "7d793037a0760186574b0282f2f435e7");
    assert_eq!(hex_of(&store, "c"), "7d793037a0760186574b0282f2f435e7");
    assert_eq!((result.inserted, result.skipped), (1, 2));
}

#[test]
fn test_frozen_timestamps_are_reproducible() {
    let frozen = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
    let collection = texts(&[("a", "hello")]);
    let opts = options(OverwritePolicy::FailOnDuplicate).with_timestamps(Timestamping::Fixed(frozen));

    let first = MemoryManifestStore::new();
    let second = MemoryManifestStore::new();
    generate(&collection, &first, &opts).unwrap();
    generate(&collection, &second, &opts).unwrap();

    assert_eq!(first.text(), second.text());
    assert!(first.text().unwrap().contains("\t2024-05-01T08:30:00Z\n"));
}

#[test]
fn test_crc32_requires_opt_in() {
    let store = MemoryManifestStore::new();
    let collection = texts(&[("a", "hello")]);
    let crc = options(OverwritePolicy::FailOnDuplicate).with_algorithm(DigestAlgorithm::Crc32);

    let err = generate(&collection, &store, &crc).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::AlgorithmNotPermitted);
    assert_eq!(store.write_count(), 0);

    generate(&collection, &store, &crc.allow_non_cryptographic(true)).unwrap();
    assert!(store.text().unwrap().contains("a\tcrc32\t3610a686\t-\n"));
}

#[test]
fn test_source_failure_aborts_without_writing() {
    let store = seeded_store();
    let before = store.text();
    let collection = texts(&[("a", "hello")]).with("broken", BrokenSource);

    let err = generate(&collection, &store, &options(OverwritePolicy::ReplaceExisting)).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::SourceRead);
    assert_eq!(err.artifact_id(), Some("broken"));
    assert!(err.run_id().is_some());
    assert_eq!(store.text(), before);
    assert_eq!(store.write_count(), 1);
}

#[test]
fn test_invalid_id_rejected_before_any_work() {
    let store = MemoryManifestStore::new();
    let err = generate(
        &texts(&[("ok", "x"), ("bad\tid", "y")]),
        &store,
        &options(OverwritePolicy::FailOnDuplicate),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(store.write_count(), 0);
}

#[test]
fn test_held_lock_is_concurrency_error() {
    let store = seeded_store();
    let _held = store.lock().unwrap();

    let err = generate(&texts(&[("a", "hello")]), &store, &options(OverwritePolicy::ReplaceExisting))
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(store.write_count(), 1);
}

#[test]
fn test_lock_released_after_run() {
    let store = MemoryManifestStore::new();
    generate(&texts(&[("a", "hello")]), &store, &options(OverwritePolicy::FailOnDuplicate)).unwrap();
    generate(&texts(&[("a", "hello")]), &store, &options(OverwritePolicy::FailOnDuplicate)).unwrap();
    assert!(store.lock().is_ok());
}

#[test]
fn test_cancelled_run_writes_nothing() {
    let store = seeded_store();
    let before = store.text();
    let token = CancelToken::new();
    let collection = Collection::new()
        .with_text("a", "hello")
        .with("cancel", CancellingSource(token.clone()));

    let err = generate(
        &collection,
        &store,
        &options(OverwritePolicy::ReplaceExisting).with_cancel(token),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Cancelled);
    assert_eq!(store.text(), before);
}

#[test]
fn test_pre_cancelled_token() {
    let store = MemoryManifestStore::new();
    let token = CancelToken::new();
    token.cancel();

    let err = generate(
        &texts(&[("a", "hello")]),
        &store,
        &options(OverwritePolicy::FailOnDuplicate).with_cancel(token),
    )
    .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Cancelled);
    assert!(store.text().is_none());
}

#[test]
fn test_parallel_generate_matches_sequential() {
    let items: Vec<(String, String)> = (0..40)
        .map(|i| (format!("artifact-{i:02}"), "x".repeat(i * 97)))
        .collect();
    let borrowed: Vec<(&str, &str)> = items.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let collection = texts(&borrowed);

    let sequential = generate(
        &collection,
        &MemoryManifestStore::new(),
        &options(OverwritePolicy::FailOnDuplicate),
    )
    .unwrap();
    let parallel = generate(
        &collection,
        &MemoryManifestStore::new(),
        &options(OverwritePolicy::FailOnDuplicate).with_workers(8),
    )
    .unwrap();

    assert_eq!(
        serialize_manifest(&sequential.manifest),
        serialize_manifest(&parallel.manifest)
    );
}
