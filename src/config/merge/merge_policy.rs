//! Built-in defaults applied beneath every other source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder seeded with the default values.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("table.draggable", false)?
        .set_default("table.droppable", false)?
        .set_default("table.allow_delete", false)?
        .set_default("table.id_prefix", "tt_uid")?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?)
}
