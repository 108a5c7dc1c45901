//! Strata
//!
//! Headless CMS scaffolding engine: declarative content types in, relational
//! schema, validation rulesets, and CRUD API specifications out.
//!
//! This is the entry point for the `strata` command-line tool.

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Quiet by default; RUST_LOG opts into engine diagnostics
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .init();

    strata_cli::run()
}
