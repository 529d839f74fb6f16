//! Environment overlay: `TREETABLE_<SECTION>__<KEY>` variables,
//! e.g. `TREETABLE_TABLE__ALLOW_DELETE=true`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment};

/// Environment source for the `TREETABLE` prefix. Values are parsed, so
/// `true` becomes a boolean.
pub fn source() -> Environment {
    Environment::with_prefix(crate::config::ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}
