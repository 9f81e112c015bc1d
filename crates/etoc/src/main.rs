//! etoc CLI - external table of contents tool.
//!
//! Provides commands for:
//! - `parse`: Parse a ToC file and print it normalized
//! - `to-project`: Create a project skeleton from a ToC file
//! - `from-project`: Create a ToC from a project folder
//! - `migrate`: Migrate a Jupyter Book v0.10 ToC file

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{FromProjectArgs, MigrateArgs, ParseArgs, ToProjectArgs};
use output::Output;

/// etoc - external table of contents for documentation projects.
#[derive(Parser)]
#[command(name = "etoc", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover etoc.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a ToC file to a site-map YAML.
    Parse(ParseArgs),
    /// Create a project directory from a ToC file.
    ToProject(ToProjectArgs),
    /// Create a ToC file from a project directory.
    FromProject(FromProjectArgs),
    /// Migrate a ToC from a previous revision.
    Migrate(MigrateArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Parse(args) => args.execute(),
        Commands::ToProject(args) => args.execute(config),
        Commands::FromProject(args) => args.execute(config),
        Commands::Migrate(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
