//! Tooling & Integration Layer
//!
//! Command-line access to the engine for inspecting fixtures and reproducing
//! drag-and-drop outcomes outside a presentation layer.

pub mod cli;

pub use cli::{Cli, CliContext, Commands};
