//! Repository configuration, stored as `config.toml` inside `.strata/`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_chunk::ChunkerConfig;
use strata_model::CommandCodecConfig;

use crate::error::{RepoError, RepoResult};

/// On-disk name of the configuration file.
pub const CONFIG_FILE: &str = "config.toml";

/// Per-repository configuration.
///
/// The chunker thresholds are part of the repository's identity: changing
/// them changes every weight-chunk digest, so they are written once at init
/// and read back on every open.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Branch created and checked out by `init`.
    pub default_branch: String,
    /// Working-tree prefix whose files are treated as model artifacts.
    pub model_prefix: String,
    /// Chunk size thresholds for model weight payloads.
    pub chunker: ChunkerConfig,
    /// External tool templates for model extraction and rebuild.
    pub codec: CommandCodecConfig,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".into(),
            model_prefix: "models".into(),
            chunker: ChunkerConfig::default(),
            codec: CommandCodecConfig::default(),
        }
    }
}

impl RepoConfig {
    /// Load configuration from `dir/config.toml`.
    pub fn load(dir: &Path) -> RepoResult<Self> {
        let raw = fs::read_to_string(dir.join(CONFIG_FILE))?;
        let config: Self = toml::from_str(&raw).map_err(|e| RepoError::Config(e.to_string()))?;
        config
            .chunker
            .validate()
            .map_err(|e| RepoError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Write configuration to `dir/config.toml`.
    pub fn save(&self, dir: &Path) -> RepoResult<()> {
        let raw = toml::to_string_pretty(self).map_err(|e| RepoError::Config(e.to_string()))?;
        fs::write(dir.join(CONFIG_FILE), raw)?;
        Ok(())
    }
}
