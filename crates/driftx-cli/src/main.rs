//! DriftX CLI
//!
//! Command-line interface for DriftX

use clap::{Parser, Subcommand};
use driftx_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "driftx")]
#[command(about = "DriftX - Content digest manifests and drift detection", long_about = None)]
struct Cli {
    /// Emit JSON logs on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Digest every artifact and write the manifest
    Generate(commands::generate::GenerateArgs),
    /// Compare current content against the manifest
    Check(commands::check::CheckArgs),
    /// Digest a single file or stdin
    Digest(commands::digest::DigestArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.log_json {
        Profile::Production
    } else {
        Profile::Development
    });

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Digest(args) => commands::digest::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
