use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fedisync_core::constants::MAX_CACHE_ITEMS;
use fedisync_core::CoreConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration that can be loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Directory holding the timeline cache database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Upper bound of cached items per session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cache_items: Option<usize>,
}

impl CliConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: CliConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Core config, with `data_dir_override` (from the command line) taking
    /// precedence over the file, then the platform data dir.
    pub fn core_config(&self, data_dir_override: Option<&Path>) -> CoreConfig {
        let data_dir = data_dir_override
            .map(Path::to_path_buf)
            .or_else(|| self.data_dir.clone())
            .unwrap_or_else(default_data_dir);

        let mut config = CoreConfig::new(data_dir);
        config.max_cache_items = self.max_cache_items.unwrap_or(MAX_CACHE_ITEMS);
        config
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fedisync")
}
