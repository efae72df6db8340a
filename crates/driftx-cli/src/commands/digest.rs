//! Single-input digest command
//!
//! Usage: driftx digest <PATH|-> [--algorithm sha256] [--encoding hex] [--truncate N] [--decimal]

use clap::Args;
use driftx_core::digest::{digest_file, digest_with_options, DigestAlgorithm, DigestOptions, Encoding};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DigestArgs {
    /// File to digest, or `-` for stdin
    pub path: PathBuf,

    /// Digest algorithm (crc32, md5, sha1, sha256, sha512)
    #[arg(long, default_value = "sha256")]
    pub algorithm: DigestAlgorithm,

    /// Output encoding (hex, base64, raw)
    #[arg(long, default_value = "hex")]
    pub encoding: Encoding,

    /// Print only the first N characters of the digest
    #[arg(long, conflicts_with = "decimal")]
    pub truncate: Option<usize>,

    /// Print a CRC32 as a decimal integer
    #[arg(long)]
    pub decimal: bool,
}

/// Execute digest
pub fn execute(args: DigestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = DigestOptions::default();
    let from_stdin = args.path.as_os_str() == "-";

    let result = if from_stdin {
        digest_with_options(std::io::stdin().lock(), args.algorithm, args.encoding, &options)?
    } else {
        digest_file(&args.path, args.algorithm, args.encoding, &options)?
    };

    let rendered = if args.decimal {
        match result.as_u32() {
            Some(value) => value.to_string(),
            None => return Err("--decimal requires --algorithm crc32".into()),
        }
    } else {
        match args.truncate {
            Some(len) => result.truncated(len),
            None => result.to_string(),
        }
    };

    let mut stdout = std::io::stdout().lock();
    if args.encoding == Encoding::Raw && !args.decimal {
        stdout.write_all(result.raw_bytes())?;
    } else {
        writeln!(stdout, "{}  {}", rendered, args.path.display())?;
    }
    stdout.flush()?;

    Ok(())
}
