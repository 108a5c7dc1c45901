//! Synthesis pipeline
//!
//! Drives the full derivation for a registry: validate the descriptors,
//! resolve relations once globally, then fan out schema, validation, and
//! API synthesis per content type. The per-type steps are pure functions of
//! the registry and the resolved graph; resolving first is what makes
//! inverse edges complete.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strata_core::{
    DatabaseType, LocaleConfig, ResultExt, StrataError, StrataResult, Validatable,
};
use strata_ir::TypeRegistry;

use crate::api::{synthesize_api_surface, OperationSpec, OPERATION_COUNT};
use crate::resolver::{resolve_relations, RelationGraph};
use crate::schema::{synthesize_schema, SchemaArtifact, Table};
use crate::validation::{synthesize_validation, RulesetBundle};

// ============================================================================
// Configuration
// ============================================================================

/// Synthesis run configuration, loadable from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Project name, used in artifact headers
    pub project: String,

    /// Target database for DDL rendering
    pub database: DatabaseType,

    /// Locale set for localized-field rules
    pub locales: LocaleConfig,

    /// Directory artifacts are written into
    pub output_dir: PathBuf,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            project: "strata".to_string(),
            database: DatabaseType::default(),
            locales: LocaleConfig::default(),
            output_dir: PathBuf::from("strata-out"),
        }
    }
}

impl SynthConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> StrataResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| StrataError::InvalidConfig(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: &Path) -> StrataResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| StrataError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).with_context(format!("config file {}", path.display()))
    }

    fn check(&self) -> StrataResult<()> {
        if self.project.is_empty() {
            return Err(StrataError::InvalidConfig(
                "project name must not be empty".to_string(),
            ));
        }
        if !self.locales.is_valid() {
            return Err(StrataError::InvalidConfig(format!(
                "default locale '{}' is not in the locale set",
                self.locales.default_locale
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

/// All artifacts synthesized for one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeArtifacts {
    /// The content type's api id
    pub api_id: String,

    pub schema: SchemaArtifact,
    pub rulesets: RulesetBundle,
    pub operations: [OperationSpec; OPERATION_COUNT],
}

/// The complete result of one synthesis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisOutput {
    /// Registry name the run was produced from
    pub registry: String,

    /// Target database the DDL is rendered for
    pub database: DatabaseType,

    /// Per-type artifacts in registry declaration order
    pub types: Vec<TypeArtifacts>,
}

impl SynthesisOutput {
    /// Artifacts for one content type
    pub fn for_type(&self, api_id: &str) -> Option<&TypeArtifacts> {
        self.types.iter().find(|t| t.api_id == api_id)
    }

    /// Render the full DDL script: base tables in dependency order, then
    /// join tables (deduplicated, sorted by name).
    pub fn schema_sql(&self) -> String {
        let mut sql = format!("-- {} schema ({})\n\n", self.registry, self.database);

        for artifacts in self.ordered_by_dependencies() {
            sql.push_str(&artifacts.schema.base_table.to_sql(self.database));
            sql.push('\n');
        }

        // The same join table appears in both participants' artifacts;
        // emit each once
        let mut join_tables: BTreeMap<&str, &Table> = BTreeMap::new();
        for artifacts in &self.types {
            for table in &artifacts.schema.join_tables {
                join_tables.entry(&table.name).or_insert(table);
            }
        }
        for table in join_tables.values() {
            sql.push_str(&table.to_sql(self.database));
            sql.push('\n');
        }

        sql
    }

    /// Order types so FK targets are created before their referrers.
    /// Cycles (self-references included) fall back to declaration order.
    fn ordered_by_dependencies(&self) -> Vec<&TypeArtifacts> {
        let mut ordered: Vec<&TypeArtifacts> = Vec::with_capacity(self.types.len());
        let mut placed: Vec<&str> = Vec::with_capacity(self.types.len());
        let mut remaining: Vec<&TypeArtifacts> = self.types.iter().collect();

        while !remaining.is_empty() {
            let mut wave = Vec::new();
            let mut deferred = Vec::new();
            for t in remaining {
                let ready = t.schema.base_table.columns.iter().all(|c| {
                    c.references.as_ref().is_none_or(|fk| {
                        fk.table == t.schema.base_table.name
                            || placed.contains(&fk.table.as_str())
                    })
                });
                if ready {
                    wave.push(t);
                } else {
                    deferred.push(t);
                }
            }

            if wave.is_empty() {
                // Cycle among the remaining types
                ordered.extend(deferred);
                break;
            }
            for t in wave {
                placed.push(&t.schema.base_table.name);
                ordered.push(t);
            }
            remaining = deferred;
        }

        ordered
    }

    /// Write all artifacts under the given directory: `schema.sql` plus one
    /// JSON document per content type.
    ///
    /// Everything is serialized before the first byte is written, so a
    /// serialization fault never leaves a partial tree behind.
    pub fn write_to_disk(&self, dir: &Path) -> StrataResult<()> {
        let mut files: Vec<(PathBuf, Vec<u8>)> = Vec::with_capacity(self.types.len() + 1);
        files.push((dir.join("schema.sql"), self.schema_sql().into_bytes()));
        for artifacts in &self.types {
            let json = serde_json::to_vec_pretty(artifacts)?;
            files.push((dir.join(format!("{}.json", artifacts.api_id)), json));
        }

        std::fs::create_dir_all(dir).map_err(|e| StrataError::FileWrite {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        for (path, bytes) in files {
            std::fs::write(&path, bytes).map_err(|e| StrataError::FileWrite {
                path: path.clone(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// Synthesizer
// ============================================================================

/// The synthesis driver
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    config: SynthConfig,
}

impl Synthesizer {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Run the full derivation for a registry.
    ///
    /// Deterministic: the same registry and configuration always produce
    /// byte-identical output.
    pub fn synthesize(&self, registry: &TypeRegistry) -> StrataResult<SynthesisOutput> {
        registry.validate()?;
        let graph = self.resolve(registry)?;

        let mut types = Vec::with_capacity(registry.len());
        for ct in registry.iter() {
            tracing::debug!(content_type = %ct.api_id, "synthesizing artifacts");

            let schema = synthesize_schema(ct, registry, &graph)?;
            let rulesets = synthesize_validation(ct, registry, &self.config.locales)?;
            let operations = synthesize_api_surface(ct, &schema.base_table, &rulesets);

            types.push(TypeArtifacts {
                api_id: ct.api_id.clone(),
                schema,
                rulesets,
                operations,
            });
        }

        tracing::info!(
            registry = %registry.name,
            types = types.len(),
            "synthesis complete"
        );

        Ok(SynthesisOutput {
            registry: registry.name.clone(),
            database: self.config.database,
            types,
        })
    }

    /// Resolve the relation graph for a registry without synthesizing
    /// artifacts
    pub fn resolve(&self, registry: &TypeRegistry) -> StrataResult<RelationGraph> {
        resolve_relations(registry)
    }

    /// Synthesize and write artifacts to the configured output directory
    pub fn run(&self, registry: &TypeRegistry) -> StrataResult<SynthesisOutput> {
        let output = self.synthesize(registry)?;
        output.write_to_disk(&self.config.output_dir)?;
        Ok(output)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::Cardinality;
    use strata_ir::{ContentType, FieldDescriptor};

    fn blog_registry() -> TypeRegistry {
        TypeRegistry::new("blog")
            .with(
                ContentType::new("user")
                    .with_field(FieldDescriptor::text("email").required().unique())
                    .with_display_field("email"),
            )
            .with(
                ContentType::new("post")
                    .with_field(FieldDescriptor::text("title").required())
                    .with_field(
                        FieldDescriptor::relation("author", "user", Cardinality::ManyToOne)
                            .required(),
                    )
                    .with_field(FieldDescriptor::relation(
                        "tags",
                        "tag",
                        Cardinality::ManyToMany,
                    ))
                    .with_display_field("title"),
            )
            .with(ContentType::new("tag").with_field(FieldDescriptor::slug("name").required()))
    }

    #[test]
    fn test_full_pipeline() {
        let output = Synthesizer::default().synthesize(&blog_registry()).unwrap();

        assert_eq!(output.types.len(), 3);
        let post = output.for_type("post").unwrap();
        assert_eq!(
            post.schema.base_table.column_names(),
            vec!["id", "title", "author_id", "created_at", "updated_at"]
        );
        assert!(post.rulesets.create.requires("authorId"));
        assert_eq!(post.operations.len(), 5);

        // Inverse edge surfaced on the user side
        let user = output.for_type("user").unwrap();
        assert!(user.schema.relations.iter().any(|r| r.name == "posts"));
    }

    #[test]
    fn test_invalid_registry_rejected() {
        let mut registry = TypeRegistry::new("bad");
        let mut ct = ContentType::new("post");
        ct.fields.clear();
        registry.content_types.push(ct);

        let err = Synthesizer::default().synthesize(&registry).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_schema_sql_dependency_order_and_dedup() {
        // post references user but is declared after it; tag's join table
        // is declared only on the post side
        let output = Synthesizer::default().synthesize(&blog_registry()).unwrap();
        let sql = output.schema_sql();

        let user_pos = sql.find("CREATE TABLE IF NOT EXISTS user ").unwrap();
        let post_pos = sql.find("CREATE TABLE IF NOT EXISTS post ").unwrap();
        assert!(user_pos < post_pos);

        assert_eq!(sql.matches("CREATE TABLE IF NOT EXISTS post_to_tag").count(), 1);
    }

    #[test]
    fn test_schema_sql_orders_referenced_types_first() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::new("comment").with_field(FieldDescriptor::relation(
                "post",
                "post",
                Cardinality::ManyToOne,
            )))
            .with(ContentType::new("post"));
        let output = Synthesizer::default().synthesize(&registry).unwrap();
        let sql = output.schema_sql();
        assert!(
            sql.find("CREATE TABLE IF NOT EXISTS post ").unwrap()
                < sql.find("CREATE TABLE IF NOT EXISTS comment ").unwrap()
        );
    }

    #[test]
    fn test_determinism() {
        let synthesizer = Synthesizer::default();
        let a = synthesizer.synthesize(&blog_registry()).unwrap();
        let b = synthesizer.synthesize(&blog_registry()).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.schema_sql(), b.schema_sql());
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_config_from_toml() {
        let config = SynthConfig::from_toml_str(
            r#"
            project = "blog"
            database = "sqlite"
            output_dir = "build/artifacts"

            [locales]
            locales = ["en", "de"]
            default_locale = "de"
            "#,
        )
        .unwrap();

        assert_eq!(config.project, "blog");
        assert_eq!(config.database, DatabaseType::SQLite);
        assert_eq!(config.output_dir, PathBuf::from("build/artifacts"));
        assert_eq!(config.locales.default_locale, "de");
    }

    #[test]
    fn test_config_defaults_and_checks() {
        let config = SynthConfig::from_toml_str("").unwrap();
        assert_eq!(config, SynthConfig::default());

        let err = SynthConfig::from_toml_str(
            r#"
            [locales]
            locales = ["en"]
            default_locale = "fr"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, StrataError::InvalidConfig(_)));
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("artifacts");

        let output = Synthesizer::default().synthesize(&blog_registry()).unwrap();
        output.write_to_disk(&out_dir).unwrap();

        let sql = std::fs::read_to_string(out_dir.join("schema.sql")).unwrap();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS post "));

        let json = std::fs::read_to_string(out_dir.join("post.json")).unwrap();
        let parsed: TypeArtifacts = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.api_id, "post");
    }
}
