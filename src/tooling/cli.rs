//! CLI Tooling
//!
//! Inspect a fixture tree from the command line: render it, try moves and
//! deletes, validate invariants and resolve drop placements. Every command
//! starts from the fixture file, nothing is written back.

use crate::config::{ConfigLoader, TreeTableConfig};
use crate::dnd::{resolve_placement, Placement, RowGeometry};
use crate::error::TreeError;
use crate::fixture::TreeFixture;
use crate::tree::{CheckReport, RowView, TreeTable};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// tree-table - inspect and manipulate tree-table fixtures
#[derive(Parser)]
#[command(name = "tree-table")]
#[command(about = "Inspect tree-table fixtures: render, move, delete, check, resolve drops")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Fixture file describing the tree (JSON, or TOML by extension)
    #[arg(long, default_value = "tree.json")]
    pub fixture: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the table rows
    Show {
        /// Expand every node first
        #[arg(long)]
        expand_all: bool,
        /// Load the whole tree without expanding
        #[arg(long)]
        load_all: bool,
        /// Include hidden rows
        #[arg(long)]
        hidden: bool,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Move a node and print the resulting table
    Move {
        /// Node to move
        node: String,
        /// New parent (omit for root level)
        #[arg(long)]
        parent: Option<String>,
        /// Sibling to insert after (omit for last position)
        #[arg(long)]
        after: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Delete a node with its subtree and print the resulting table
    Delete {
        node: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate structural invariants of the fully loaded tree
    Check {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Resolve where a drop would land
    Resolve {
        /// Row hovered by the cursor
        hover: String,
        /// Dragged row, when it belongs to the same table
        #[arg(long)]
        dragged: Option<String>,
        /// Cursor height within the hovered row, 0.0 (top) to 1.0 (bottom)
        #[arg(long, default_value = "0.5")]
        fraction: f64,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Loaded fixture and configuration
pub struct CliContext {
    fixture: TreeFixture,
    config: TreeTableConfig,
}

impl CliContext {
    /// Create a new CLI context
    pub fn new(fixture_path: PathBuf, config_path: Option<PathBuf>) -> Result<Self, TreeError> {
        let config = match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => {
                let workspace = fixture_path
                    .parent()
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("."));
                ConfigLoader::load(&workspace)?
            }
        };
        let fixture = TreeFixture::from_path(&fixture_path)?;
        Ok(Self { fixture, config })
    }

    pub fn from_parts(fixture: TreeFixture, config: TreeTableConfig) -> Self {
        Self { fixture, config }
    }

    pub fn config(&self) -> &TreeTableConfig {
        &self.config
    }

    fn build_table(&self) -> Result<TreeTable<String>, TreeError> {
        self.fixture
            .clone()
            .into_table("cli", self.config.table.clone())
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, TreeError> {
        let mut table = self.build_table()?;
        match command {
            Commands::Show {
                expand_all,
                load_all,
                hidden,
                format,
            } => {
                if *load_all {
                    table.load_all()?;
                }
                if *expand_all {
                    table.expand_all()?;
                }
                let rows = collect_rows(&table, *hidden);
                if format == "json" {
                    return Ok(serde_json::to_string_pretty(&rows)?);
                }
                Ok(format!("{}\n\n{}", format_heading("Rows"), format_rows(&table, &rows)))
            }
            Commands::Move {
                node,
                parent,
                after,
                format,
            } => {
                table.load_all()?;
                table.expand_all()?;
                let moved = table.move_node(node, parent.as_deref(), after.as_deref())?;
                info!(node_id = %node, refused = moved.is_none(), "CLI move");
                let rows = collect_rows(&table, false);
                if format == "json" {
                    return Ok(serde_json::to_string_pretty(&json!({
                        "moved": moved,
                        "rows": rows,
                    }))?);
                }
                let summary = match moved {
                    Some(ids) => format!("Moved {} row(s)", ids.len()),
                    None => "Move refused".to_string(),
                };
                Ok(format!(
                    "{}\n\n{}\n\n{}",
                    format_heading("Move"),
                    summary,
                    format_rows(&table, &rows)
                ))
            }
            Commands::Delete { node, format } => {
                table.load_all()?;
                table.expand_all()?;
                let removed = table.delete_node(node)?;
                let rows = collect_rows(&table, false);
                if format == "json" {
                    return Ok(serde_json::to_string_pretty(&json!({
                        "removed": removed,
                        "rows": rows,
                    }))?);
                }
                Ok(format!(
                    "{}\n\nRemoved {} row(s): {}\n\n{}",
                    format_heading("Delete"),
                    removed.len(),
                    removed.join(", "),
                    format_rows(&table, &rows)
                ))
            }
            Commands::Check { format } => {
                table.load_all()?;
                table.expand_all()?;
                let report = table.check_invariants();
                if format == "json" {
                    return Ok(serde_json::to_string_pretty(&report)?);
                }
                Ok(format_check(&report))
            }
            Commands::Resolve {
                hover,
                dragged,
                fraction,
                format,
            } => {
                table.load_all()?;
                table.expand_all()?;
                let geometry = RowGeometry::new(0.0, 1.0);
                let placement =
                    resolve_placement(&table, dragged.as_deref(), hover, geometry, *fraction)?;
                if format == "json" {
                    return Ok(serde_json::to_string_pretty(&placement)?);
                }
                Ok(format_placement(placement.as_ref()))
            }
        }
    }
}

fn collect_rows(table: &TreeTable<String>, include_hidden: bool) -> Vec<RowView> {
    table
        .rows()
        .into_iter()
        .filter(|row| include_hidden || row.visible)
        .collect()
}

/// Format a section heading with bold/underline.
fn format_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

fn format_rows(table: &TreeTable<String>, rows: &[RowView]) -> String {
    let mut out = Table::new();
    out.load_preset(UTF8_BORDERS_ONLY);
    out.set_header(vec!["Label", "Id", "Level", "Children", "State"]);
    for row in rows {
        let marker = if row.children_count == 0 {
            " "
        } else if row.expanded {
            "▾"
        } else {
            "▸"
        };
        let label = table
            .get(&row.id)
            .map(|node| node.content().clone())
            .unwrap_or_default();
        let state = match (row.visible, row.loaded) {
            (true, true) => "visible",
            (true, false) => "visible, not loaded",
            (false, true) => "hidden",
            (false, false) => "hidden, not loaded",
        };
        out.add_row(vec![
            format!("{}{} {}", "  ".repeat(row.level), marker, label),
            row.id.clone(),
            row.level.to_string(),
            row.children_count.to_string(),
            state.to_string(),
        ]);
    }
    out.to_string()
}

fn format_check(report: &CheckReport) -> String {
    let mut out = format!("{}\n\n", format_heading("Invariants"));
    out.push_str(&format!("  Nodes: {}\n", report.node_count));
    if report.is_valid() {
        out.push_str(&format!("  Status: {}\n", "ok".green()));
        return out;
    }
    out.push_str(&format!(
        "  Status: {} ({} violation(s))\n",
        "invalid".red(),
        report.errors.len()
    ));
    for error in &report.errors {
        out.push_str(&format!("  - {}\n", error));
    }
    out
}

fn format_placement(placement: Option<&Placement>) -> String {
    let mut out = format!("{}\n\n", format_heading("Placement"));
    let Some(placement) = placement else {
        out.push_str("  Drop not possible on this row\n");
        return out;
    };
    out.push_str(&format!("  Insert: {:?}\n", placement.insert));
    out.push_str(&format!(
        "  Parent: {}\n",
        placement.new_parent().unwrap_or("(root level)")
    ));
    out.push_str(&format!("  Position: {:?}\n", placement.position));
    if let Some(row) = &placement.indicator_row {
        out.push_str(&format!("  Indicator: {}\n", row));
    }
    out
}
