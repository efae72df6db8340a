//! Manifest generation command
//!
//! Usage: driftx generate [--config driftx.toml] [--algorithm sha256] [--overwrite replace_existing]

use crate::commands::ConfigArgs;
use clap::Args;
use driftx_core::digest::DigestAlgorithm;
use driftx_core::manifest::OverwritePolicy;
use driftx_engine::{generate, GenerateOptions};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Digest algorithm (crc32, md5, sha1, sha256, sha512)
    #[arg(long)]
    pub algorithm: Option<DigestAlgorithm>,

    /// fail_on_duplicate, replace_existing or merge_new_only
    #[arg(long)]
    pub overwrite: Option<OverwritePolicy>,

    /// Permit CRC32
    #[arg(long)]
    pub allow_non_cryptographic: bool,
}

/// Execute generate
pub fn execute(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.load()?;
    let store = args.common.store(&config);
    let collection = config.collection()?;

    let options = GenerateOptions::default()
        .with_algorithm(args.algorithm.unwrap_or(config.algorithm))
        .with_overwrite(args.overwrite.unwrap_or(config.overwrite))
        .allow_non_cryptographic(args.allow_non_cryptographic || config.allow_non_cryptographic)
        .with_workers(args.common.workers(&config)?)
        .with_digest_options(config.digest_options());

    let result = generate(&collection, &store, &options)?;

    println!("Manifest written: {}", store.path().display());
    println!("  entries: {}", result.manifest.len());
    println!(
        "  inserted: {}, replaced: {}, skipped: {}",
        result.inserted, result.replaced, result.skipped
    );
    println!("  run_id: {}", result.run_id);

    Ok(())
}
