//! Subcommand implementations

pub mod check;
pub mod digest;
pub mod generate;

use clap::Args;
use driftx_store::{DriftConfig, FsManifestStore};
use std::path::PathBuf;

/// Flags shared by `generate` and `check`
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Collection config file
    #[arg(long, default_value = driftx_store::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Manifest location, overriding the config (relative to the working directory)
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Worker threads for digesting
    #[arg(long)]
    pub workers: Option<usize>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<DriftConfig, Box<dyn std::error::Error>> {
        Ok(DriftConfig::load(&self.config)?)
    }

    pub fn store(&self, config: &DriftConfig) -> FsManifestStore {
        match &self.manifest {
            Some(path) => FsManifestStore::new(path).with_format(config.manifest_format),
            None => config.manifest_store(),
        }
    }

    pub fn workers(&self, config: &DriftConfig) -> Result<usize, Box<dyn std::error::Error>> {
        match self.workers.or(config.workers) {
            Some(0) => Err("--workers must be greater than zero".into()),
            Some(n) => Ok(n),
            None => Ok(driftx_engine::pool::default_workers()),
        }
    }
}
