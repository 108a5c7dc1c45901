//! # Strata CLI
//!
//! Command-line interface for Strata.
//!
//! ## Commands
//!
//! - `new` - Scaffold a starter content-type declarations file
//! - `generate` - Synthesize schema, validation, and API artifacts
//! - `validate` - Validate a declarations file
//! - `info` - Display a summary of a declarations file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Strata - headless CMS scaffolding engine
#[derive(Debug, Parser)]
#[command(name = "strata", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scaffold a starter declarations file
    New {
        /// Project name
        name: String,

        /// Destination path (defaults to `<name>.strata.json`)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Synthesize artifacts from a declarations file
    Generate {
        /// Path to the declarations file
        declarations: PathBuf,

        /// Path to a TOML configuration file
        #[arg(short, long, env = "STRATA_CONFIG")]
        config: Option<PathBuf>,

        /// Output directory (overrides the configured one)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Target database: postgres, mysql, or sqlite
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Validate a declarations file without generating anything
    Validate {
        /// Path to the declarations file
        declarations: PathBuf,
    },

    /// Display a summary of a declarations file
    Info {
        /// Path to the declarations file
        declarations: PathBuf,
    },
}

/// Parse arguments and run the selected command
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::New { name, out } => commands::new_project(&name, out.as_deref()),
        Commands::Generate {
            declarations,
            config,
            out,
            database,
        } => commands::generate(&declarations, config.as_deref(), out.as_deref(), database.as_deref()),
        Commands::Validate { declarations } => commands::validate(&declarations),
        Commands::Info { declarations } => commands::info(&declarations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_args() {
        let cli = Cli::parse_from([
            "strata",
            "generate",
            "blog.strata.json",
            "--database",
            "sqlite",
            "--out",
            "build",
        ]);
        match cli.command {
            Commands::Generate {
                declarations,
                database,
                out,
                ..
            } => {
                assert_eq!(declarations, PathBuf::from("blog.strata.json"));
                assert_eq!(database.as_deref(), Some("sqlite"));
                assert_eq!(out, Some(PathBuf::from("build")));
            }
            other => panic!("expected generate, got {:?}", other),
        }
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
