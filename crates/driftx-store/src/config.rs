//! TOML collection config
//!
//! ```toml
//! manifest = "driftx.manifest"
//! algorithm = "sha256"
//! overwrite = "replace_existing"
//!
//! [[artifact]]
//! id = "lorem"
//! file = "resources/lorem.txt"
//! ```
//!
//! Relative paths resolve against the directory holding the config file.

#![allow(clippy::result_large_err)]

use crate::errors::{config_error, Result};
use crate::fs_store::{FsManifestStore, ManifestFormat};
use driftx_core::digest::stream::DEFAULT_CHUNK_SIZE;
use driftx_core::digest::{DigestAlgorithm, DigestOptions};
use driftx_core::manifest::{validate_id, OverwritePolicy};
use driftx_core::source::{Artifact, Collection, CommandSource, FileSource, MemorySource};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name looked up by the CLI
pub const DEFAULT_CONFIG_FILE: &str = "driftx.toml";

fn default_manifest() -> PathBuf {
    PathBuf::from("driftx.manifest")
}

fn default_algorithm() -> DigestAlgorithm {
    DigestAlgorithm::Sha256
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

/// Parsed `driftx.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriftConfig {
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,
    #[serde(default)]
    pub manifest_format: ManifestFormat,
    #[serde(default = "default_algorithm")]
    pub algorithm: DigestAlgorithm,
    #[serde(default)]
    pub allow_non_cryptographic: bool,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default)]
    pub workers: Option<usize>,
    #[serde(default)]
    pub overwrite: OverwritePolicy,
    #[serde(default, rename = "artifact")]
    pub artifacts: Vec<ArtifactSpec>,
    #[serde(skip)]
    base_dir: PathBuf,
    #[serde(skip)]
    source_path: PathBuf,
}

/// One `[[artifact]]` table; exactly one of `file`, `command`, `text`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactSpec {
    pub id: String,
    pub file: Option<PathBuf>,
    pub command: Option<Vec<String>>,
    pub text: Option<String>,
}

impl DriftConfig {
    /// Read and validate a config file
    ///
    /// ## Errors
    ///
    /// `Config` for unreadable files, TOML errors and invalid artifacts.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| config_error(path, format!("Failed to read config: {}", e)))?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml_str(&text, path, &base_dir)
    }

    /// Parse config text; `origin` is only used in error messages
    ///
    /// ## Errors
    ///
    /// `Config` for TOML errors and invalid artifacts.
    pub fn from_toml_str(text: &str, origin: &Path, base_dir: &Path) -> Result<Self> {
        let mut config: DriftConfig = toml::from_str(text)
            .map_err(|e| config_error(origin, format!("TOML parse error: {}", e)))?;
        config.base_dir = base_dir.to_path_buf();
        config.source_path = origin.to_path_buf();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let origin = &self.source_path;
        if self.chunk_size == 0 {
            return Err(config_error(origin, "chunk_size must be greater than zero"));
        }
        if self.workers == Some(0) {
            return Err(config_error(origin, "workers must be greater than zero"));
        }
        for spec in &self.artifacts {
            validate_id(&spec.id)
                .map_err(|e| config_error(origin, e.to_string()).with_artifact_id(&spec.id))?;
            let sources = [
                spec.file.is_some(),
                spec.command.is_some(),
                spec.text.is_some(),
            ]
            .into_iter()
            .filter(|set| *set)
            .count();
            if sources != 1 {
                return Err(config_error(
                    origin,
                    format!(
                        "artifact '{}' must set exactly one of file, command, text",
                        spec.id
                    ),
                )
                .with_artifact_id(&spec.id));
            }
            if matches!(&spec.command, Some(argv) if argv.is_empty()) {
                return Err(config_error(
                    origin,
                    format!("artifact '{}' has an empty command", spec.id),
                )
                .with_artifact_id(&spec.id));
            }
        }
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.resolve(&self.manifest)
    }

    pub fn manifest_store(&self) -> FsManifestStore {
        FsManifestStore::new(self.manifest_path()).with_format(self.manifest_format)
    }

    pub fn digest_options(&self) -> DigestOptions {
        DigestOptions::default().with_chunk_size(self.chunk_size)
    }

    /// Build the artifact collection in file order
    ///
    /// ## Errors
    ///
    /// `Config` if an artifact has no usable source.
    pub fn collection(&self) -> Result<Collection> {
        self.artifacts
            .iter()
            .map(|spec| self.artifact(spec))
            .collect::<Result<Vec<_>>>()
            .map(|artifacts| artifacts.into_iter().collect())
    }

    fn artifact(&self, spec: &ArtifactSpec) -> Result<Artifact> {
        match (&spec.file, &spec.command, &spec.text) {
            (Some(file), None, None) => Ok(Artifact::new(&spec.id, FileSource::new(self.resolve(file)))),
            (None, Some(argv), None) => {
                let command = CommandSource::from_argv(argv)
                    .map_err(|e| config_error(&self.source_path, e.to_string()).with_artifact_id(&spec.id))?
                    .current_dir(self.base_dir.clone());
                Ok(Artifact::new(&spec.id, command))
            }
            (None, None, Some(text)) => Ok(Artifact::new(&spec.id, MemorySource::new(text.as_bytes()))),
            _ => Err(config_error(
                &self.source_path,
                format!("artifact '{}' must set exactly one of file, command, text", spec.id),
            )
            .with_artifact_id(&spec.id)),
        }
    }
}
