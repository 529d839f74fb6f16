//! Logging System
//!
//! Structured logging built on `tracing`. The engine itself only emits
//! events; binaries and tests decide where they go by calling
//! [`init_logging`] once.

use crate::error::TreeError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Resolve the log file path with precedence: explicit path,
/// `TREETABLE_LOG_FILE`, configured path, then `tree-table.log` in the
/// platform state directory.
pub fn resolve_log_file_path(
    explicit: Option<PathBuf>,
    configured: Option<PathBuf>,
) -> Result<PathBuf, TreeError> {
    let from_env = std::env::var("TREETABLE_LOG_FILE").ok().map(PathBuf::from);
    let chosen = [explicit, from_env, configured]
        .into_iter()
        .flatten()
        .find(|p| !p.as_os_str().is_empty());
    match chosen {
        Some(path) => Ok(path),
        None => default_log_file_path(),
    }
}

fn default_log_file_path() -> Result<PathBuf, TreeError> {
    let project_dirs = directories::ProjectDirs::from("", "", "tree-table").ok_or_else(|| {
        TreeError::ConfigError("Could not determine platform directories for log file".to_string())
    })?;
    // state_dir is Linux only.
    let dir = project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir());
    Ok(dir.join("tree-table.log"))
}

/// Logging section of `TreeTableConfig`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `text` or `json`.
    #[serde(default = "default_format")]
    pub format: String,

    /// `stdout`, `stderr`, `file`, `file+stderr` or `both`.
    #[serde(default = "default_output")]
    pub output: String,

    /// Used when `output` includes a file. Falls back to the state directory.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// ANSI colors for text output on a terminal stream.
    #[serde(default = "default_true")]
    pub color: bool,

    /// Per-target levels, e.g. `tree_table::dnd = "trace"`.
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where formatted events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    Stdout,
    Stderr,
    Both,
    File,
    FileAndStderr,
}

impl Sink {
    fn parse(raw: &str) -> Result<Self, TreeError> {
        match raw {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "both" => Ok(Self::Both),
            "file" => Ok(Self::File),
            "file+stderr" => Ok(Self::FileAndStderr),
            other => Err(TreeError::ConfigError(format!(
                "Invalid log output '{}', expected stdout, stderr, both, file or file+stderr",
                other
            ))),
        }
    }

    fn writes_file(self) -> bool {
        matches!(self, Self::File | Self::FileAndStderr)
    }
}

/// Install the global subscriber.
///
/// `TREETABLE_LOG*` environment variables win over `config`; the caller
/// folds CLI flags into `config` first.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), TreeError> {
    let defaults = LoggingConfig::default();
    let config = config.unwrap_or(&defaults);

    if !config.enabled {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .with(fmt::layer().with_writer(std::io::sink))
            .try_init()
            .map_err(already_initialized);
    }

    let filter = build_env_filter(config)?;
    let format = effective_format(config)?;
    let sink = match std::env::var("TREETABLE_LOG_OUTPUT") {
        Ok(raw) => Sink::parse(&raw)?,
        Err(_) => Sink::parse(&config.output)?,
    };
    let writer = build_writer(sink, config)?;

    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoUtc::rfc_3339());
    let registry = Registry::default().with(filter);
    let result = match format {
        LogFormat::Json => registry.with(layer.json().with_writer(writer)).try_init(),
        LogFormat::Text => registry
            .with(
                layer
                    .with_ansi(config.color && !sink.writes_file())
                    .with_writer(writer),
            )
            .try_init(),
    };
    result.map_err(already_initialized)
}

fn already_initialized(err: impl std::fmt::Display) -> TreeError {
    TreeError::ConfigError(format!("Logging already initialized: {}", err))
}

fn build_writer(sink: Sink, config: &LoggingConfig) -> Result<BoxMakeWriter, TreeError> {
    let writer = match sink {
        Sink::Stdout => BoxMakeWriter::new(std::io::stdout),
        Sink::Stderr => BoxMakeWriter::new(std::io::stderr),
        Sink::Both => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        Sink::File => BoxMakeWriter::new(open_log_file(config)?),
        Sink::FileAndStderr => BoxMakeWriter::new(open_log_file(config)?.and(std::io::stderr)),
    };
    Ok(writer)
}

fn open_log_file(config: &LoggingConfig) -> Result<Arc<File>, TreeError> {
    let path = resolve_log_file_path(None, config.file.clone())?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| {
            TreeError::ConfigError(format!("Cannot create log directory {}: {}", dir.display(), e))
        })?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| {
            TreeError::ConfigError(format!("Cannot open log file {}: {}", path.display(), e))
        })?;
    Ok(Arc::new(file))
}

/// `TREETABLE_LOG` replaces the whole filter. Otherwise the configured
/// level plus per-module directives, then `TREETABLE_LOG_MODULES`
/// (`target=level,...`).
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, TreeError> {
    if let Ok(filter) = EnvFilter::try_from_env("TREETABLE_LOG") {
        return Ok(filter);
    }
    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let env_modules = std::env::var("TREETABLE_LOG_MODULES").unwrap_or_default();
    let env_pairs = env_modules
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(target, level)| (target.trim(), level.trim()));
    let configured = config
        .modules
        .iter()
        .map(|(target, level)| (target.as_str(), level.as_str()));

    configured
        .chain(env_pairs)
        .try_fold(EnvFilter::new(&config.level), |filter, (target, level)| -> Result<EnvFilter, TreeError> {
            Ok(filter.add_directive(parse_directive(target, level)?))
        })
}

fn parse_directive(target: &str, level: &str) -> Result<Directive, TreeError> {
    format!("{}={}", target, level)
        .parse()
        .map_err(|e| TreeError::ConfigError(format!("Invalid log directive: {}", e)))
}

/// An invalid `TREETABLE_LOG_FORMAT` is ignored; an invalid configured
/// format is an error.
fn effective_format(config: &LoggingConfig) -> Result<LogFormat, TreeError> {
    if let Some(format) = std::env::var("TREETABLE_LOG_FORMAT")
        .ok()
        .and_then(|raw| LogFormat::parse(&raw))
    {
        return Ok(format);
    }
    LogFormat::parse(&config.format).ok_or_else(|| {
        TreeError::ConfigError(format!(
            "Invalid log format '{}', expected text or json",
            config.format
        ))
    })
}
