//! Command implementations

use anyhow::Context;
use colored::Colorize;
use std::path::{Path, PathBuf};
use strata_core::{Cardinality, DatabaseType, Persistable, Validatable};
use strata_ir::{ContentType, FieldDescriptor, TypeRegistry};
use strata_synth::{resolve_relations, SynthConfig, Synthesizer};

/// Scaffold a starter declarations file with a minimal example type
pub fn new_project(name: &str, out: Option<&Path>) -> anyhow::Result<()> {
    let path = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{}.strata.json", name)));
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    let registry = TypeRegistry::new(name).with(
        ContentType::new("page")
            .with_display_name("Page")
            .with_field(FieldDescriptor::text("title").required())
            .with_field(FieldDescriptor::slug("slug").required().unique())
            .with_field(FieldDescriptor::rich_text("body"))
            .with_display_field("title"),
    );
    registry
        .save_to_file(&path)
        .with_context(|| format!("writing {}", path.display()))?;

    println!("{} {}", "Created".green().bold(), path.display());
    println!("Next: edit the declarations, then run `strata generate {}`", path.display());
    Ok(())
}

/// Synthesize all artifacts from a declarations file
pub fn generate(
    declarations: &Path,
    config: Option<&Path>,
    out: Option<&Path>,
    database: Option<&str>,
) -> anyhow::Result<()> {
    let registry = load_registry(declarations)?;

    let mut config = match config {
        Some(path) => SynthConfig::load(path)?,
        None => SynthConfig {
            project: registry.name.clone(),
            ..SynthConfig::default()
        },
    };
    if let Some(dir) = out {
        config.output_dir = dir.to_path_buf();
    }
    if let Some(db) = database {
        config.database = DatabaseType::parse(db)
            .with_context(|| format!("unknown database '{}'", db))?;
    }

    let output_dir = config.output_dir.clone();
    let output = Synthesizer::new(config).run(&registry)?;

    println!(
        "{} {} content type(s) -> {}",
        "Generated".green().bold(),
        output.types.len(),
        output_dir.display()
    );
    for artifacts in &output.types {
        println!(
            "  {} {} ({} columns, {} join table(s))",
            "+".green(),
            artifacts.api_id,
            artifacts.schema.base_table.columns.len(),
            artifacts.schema.join_tables.len()
        );
    }
    Ok(())
}

/// Validate a declarations file and report every problem found
pub fn validate(declarations: &Path) -> anyhow::Result<()> {
    let registry = load_registry(declarations)?;

    let mut errors = registry.validation_errors();
    if errors.is_empty() {
        // Relation targets are only checkable across the whole registry
        if let Err(e) = resolve_relations(&registry) {
            errors.push(e.to_string());
        }
    }

    if errors.is_empty() {
        println!(
            "{} {} content type(s), no problems found",
            "Valid".green().bold(),
            registry.len()
        );
        Ok(())
    } else {
        for error in &errors {
            eprintln!("{} {}", "error:".red().bold(), error);
        }
        anyhow::bail!("{} problem(s) found", errors.len());
    }
}

/// Print a summary of the declarations: types, fields, and relations
pub fn info(declarations: &Path) -> anyhow::Result<()> {
    let registry = load_registry(declarations)?;
    let graph = resolve_relations(&registry).ok();

    println!("{} {}", "Registry:".bold(), registry.name);
    println!("{} {}", "Types:".bold(), registry.len());
    println!();

    for ct in registry.iter() {
        println!(
            "{} {} ({})",
            "●".cyan(),
            ct.display_name.bold(),
            ct.api_id
        );
        for field in &ct.fields {
            let mut flags = Vec::new();
            if field.required {
                flags.push("required");
            }
            if field.unique {
                flags.push("unique");
            }
            if field.localized {
                flags.push("localized");
            }
            let flags = if flags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", flags.join(", "))
            };
            println!(
                "    {} {}{}",
                field.api_id.cyan(),
                field.kind.display_name().dimmed(),
                flags.dimmed()
            );
        }

        if let Some(graph) = &graph {
            for edge in graph.edges_for(&ct.api_id) {
                let arrow = match edge.cardinality {
                    Cardinality::ManyToMany => "<->",
                    _ => "->",
                };
                let origin = if edge.is_synthesized() {
                    " (synthesized)"
                } else {
                    ""
                };
                println!(
                    "    {} {} {} {}{}",
                    "~".yellow(),
                    edge.name,
                    arrow,
                    edge.to_type,
                    origin.dimmed()
                );
            }
        }
        println!();
    }

    if let Some(graph) = &graph {
        let join_tables: Vec<&str> = graph.join_tables().map(|jt| jt.id.as_str()).collect();
        if !join_tables.is_empty() {
            println!("{} {}", "Join tables:".bold(), join_tables.join(", "));
        }
    }
    Ok(())
}

fn load_registry(path: &Path) -> anyhow::Result<TypeRegistry> {
    TypeRegistry::load_from_file(path)
        .with_context(|| format!("loading declarations from {}", path.display()))
}
