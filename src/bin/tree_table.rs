//! Tree-Table CLI Binary
//!
//! Command-line interface for inspecting tree-table fixtures.

use clap::Parser;
use std::process;
use tree_table::logging::init_logging;
use tree_table::tooling::cli::{Cli, CliContext};

fn main() {
    let cli = Cli::parse();

    // Load fixture and configuration
    let context = match CliContext::new(cli.fixture.clone(), cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error loading fixture: {}", e);
            process::exit(1);
        }
    };

    // CLI flags override the configured logging
    let mut logging = context.config().logging.clone();
    if let Some(level) = &cli.log_level {
        logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        logging.output = output.clone();
    }
    if let Some(file) = &cli.log_file {
        logging.file = Some(file.clone());
    }
    if let Err(e) = init_logging(Some(&logging)) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    // Execute command
    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
