//! Configuration for catalog loading, patching, and storage.
//!
//! Load order: `catalog-tool.toml` next to the catalog → environment variables → defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the optional config file looked up in the catalog's directory.
pub const CONFIG_FILE: &str = "catalog-tool.toml";

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub input: InputConfig,
    pub patch: PatchConfig,
    pub storage: StorageConfig,
}

/// Input file configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// File names accepted when a catalog is passed without a mode
    /// (drag-and-drop). Compared case-insensitively.
    pub drop_target_names: Vec<String>,
}

/// Patch write-back configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchConfig {
    /// Suffix for the preserved original catalog.
    pub backup_suffix: String,
    /// Suffix for the staged output before it is swapped in.
    pub staging_suffix: String,
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// zstd level used when writing packed catalogs.
    pub compression_level: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drop_target_names: vec!["catalog.json".to_string(), "catalog.bin".to_string()],
        }
    }
}

impl Default for PatchConfig {
    fn default() -> Self {
        Self {
            backup_suffix: ".old".to_string(),
            staging_suffix: ".patched".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            compression_level: 3,
        }
    }
}

/// Helper to parse an env var and apply it to a config field.
fn env_override<T: std::str::FromStr>(var: &str, target: &mut T) {
    if let Ok(v) = std::env::var(var)
        && let Ok(n) = v.parse()
    {
        *target = n;
    }
}

impl ToolConfig {
    /// Load config from `catalog-tool.toml` in `dir`, with env var overrides.
    /// Falls back to defaults if no config file exists.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };

        env_override(
            "CATALOG_TOOL_BACKUP_SUFFIX",
            &mut config.patch.backup_suffix,
        );
        env_override(
            "CATALOG_TOOL_STAGING_SUFFIX",
            &mut config.patch.staging_suffix,
        );
        env_override(
            "CATALOG_TOOL_ZSTD_LEVEL",
            &mut config.storage.compression_level,
        );

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the staged replacement unsafe.
    pub fn validate(&self) -> Result<()> {
        let patch = &self.patch;
        if patch.backup_suffix.is_empty() || patch.staging_suffix.is_empty() {
            anyhow::bail!("backup_suffix and staging_suffix must not be empty");
        }
        if patch.backup_suffix == patch.staging_suffix {
            anyhow::bail!(
                "backup_suffix and staging_suffix must differ (both are {:?})",
                patch.backup_suffix
            );
        }
        if !(1..=22).contains(&self.storage.compression_level) {
            anyhow::bail!(
                "compression_level must be between 1 and 22, got {}",
                self.storage.compression_level
            );
        }
        Ok(())
    }
}
