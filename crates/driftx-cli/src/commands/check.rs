//! Drift check command
//!
//! Exits non-zero when any entry is not `MATCH`. Entries are expected to use
//! the configured algorithm (MD5 for legacy reference files); an entry
//! recorded with another algorithm reports `ALGORITHM_MISMATCH`.

use crate::commands::ConfigArgs;
use clap::Args;
use driftx_core::digest::DigestAlgorithm;
use driftx_core::manifest::{CheckReport, CheckStatus};
use driftx_engine::{check, CheckOptions};
use driftx_store::{DriftConfig, ManifestFormat};

#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub common: ConfigArgs,

    /// Expect every entry to use this algorithm instead of the configured one
    #[arg(long, conflicts_with = "any_algorithm")]
    pub algorithm: Option<DigestAlgorithm>,

    /// Recompute each entry with its stored algorithm, whatever it is
    #[arg(long)]
    pub any_algorithm: bool,

    /// Read the manifest as an `id,md5` reference file
    #[arg(long)]
    pub legacy_csv: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute check
pub fn execute(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.common.load()?;
    let mut store = args.common.store(&config);
    if args.legacy_csv {
        store = store.with_format(ManifestFormat::LegacyCsv);
    }
    let collection = config.collection()?;

    let mut options = CheckOptions::default()
        .with_workers(args.common.workers(&config)?)
        .with_digest_options(config.digest_options());
    if let Some(algorithm) = expected_algorithm(&args, &config, store.format()) {
        options = options.with_algorithm(algorithm);
    }

    let report = check(&collection, &store, &options)?;

    if args.json {
        let body = serde_json::json!({
            "manifest": store.path().display().to_string(),
            "passed": report.passed(),
            "summary": report.summary(),
            "outcomes": report.outcomes(),
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print_report(&report);
    }

    if report.passed() {
        Ok(())
    } else {
        let summary = report.summary();
        Err(format!(
            "drift detected: {} of {} entries failed",
            summary.failed(),
            summary.total
        )
        .into())
    }
}

fn expected_algorithm(
    args: &CheckArgs,
    config: &DriftConfig,
    format: ManifestFormat,
) -> Option<DigestAlgorithm> {
    if args.any_algorithm {
        return None;
    }
    match (args.algorithm, format) {
        (Some(algorithm), _) => Some(algorithm),
        (None, ManifestFormat::LegacyCsv) => Some(DigestAlgorithm::Md5),
        (None, ManifestFormat::Native) => Some(config.algorithm),
    }
}

fn print_report(report: &CheckReport) {
    for outcome in report.outcomes() {
        match &outcome.status {
            CheckStatus::Mismatch { expected, actual } => println!(
                "{:<20} {}  expected {} got {}",
                outcome.status.label(),
                outcome.id,
                expected.to_hex(),
                actual.to_hex()
            ),
            CheckStatus::MissingSource {
                reason: Some(reason),
            } => println!("{:<20} {}  ({})", outcome.status.label(), outcome.id, reason),
            CheckStatus::AlgorithmMismatch { stored, requested } => println!(
                "{:<20} {}  stored {} requested {}",
                outcome.status.label(),
                outcome.id,
                stored,
                requested
            ),
            status => println!("{:<20} {}", status.label(), outcome.id),
        }
    }

    let summary = report.summary();
    println!();
    println!(
        "{} entries: {} matched, {} mismatched, {} missing source, {} missing expectation, {} algorithm mismatch",
        summary.total,
        summary.matched,
        summary.mismatched,
        summary.missing_source,
        summary.missing_expectation,
        summary.algorithm_mismatch
    );
}
