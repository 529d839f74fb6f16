//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::TreeTableConfig;
use config::ConfigError;
use std::path::{Path, PathBuf};

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Global config file path ($XDG_CONFIG_HOME/tree-table/config.toml)
    pub fn global_config_path() -> Option<PathBuf> {
        super::paths::xdg_root::global_config_path()
    }

    /// Load configuration from files and environment.
    pub fn load(workspace_root: &Path) -> Result<TreeTableConfig, ConfigError> {
        MergeService::load(workspace_root)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<TreeTableConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> TreeTableConfig {
        TreeTableConfig::default()
    }
}
