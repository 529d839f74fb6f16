//! Configuration
//!
//! Layered configuration for table defaults and logging, composed with the
//! `config` crate: built-in defaults, the global file, the workspace file and
//! finally `TREETABLE_*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;

pub use facade::ConfigLoader;

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

/// Name of the per-workspace configuration file
pub const WORKSPACE_CONFIG_FILE: &str = "tree-table.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "TREETABLE";

/// Behaviour switches of a single table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOptions {
    /// Rows of this table may be dragged
    #[serde(default)]
    pub draggable: bool,

    /// Rows may be dropped on this table
    #[serde(default)]
    pub droppable: bool,

    /// The Delete key removes the selected rows
    #[serde(default)]
    pub allow_delete: bool,

    /// Prefix of generated node ids
    #[serde(default = "default_id_prefix")]
    pub id_prefix: String,
}

fn default_id_prefix() -> String {
    "tt_uid".to_string()
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            draggable: false,
            droppable: false,
            allow_delete: false,
            id_prefix: default_id_prefix(),
        }
    }
}

impl TableOptions {
    /// Options for a table that both gives and accepts rows
    pub fn drag_and_drop() -> Self {
        Self {
            draggable: true,
            droppable: true,
            ..Self::default()
        }
    }
}

/// Root configuration document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeTableConfig {
    #[serde(default)]
    pub table: TableOptions,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TreeTableConfig {
    /// Parse a TOML document without any layering.
    pub fn from_toml_str(raw: &str) -> Result<Self, crate::error::TreeError> {
        Ok(toml::from_str(raw)?)
    }
}
