//! Schema synthesis
//!
//! Derives the relational storage schema from content-type descriptors and
//! the resolved relation graph: one base table per content type, one join
//! table per distinct join-table identity, and per-table relationship
//! metadata for eager loading.
//!
//! Naming is the bit-exact contract with the storage engine: column names
//! are the snake_case form of the field api id, many-to-one foreign-key
//! columns are `{snake}_id`, timestamp columns are `created_at`/`updated_at`
//! and the soft-delete marker is `deleted_at`. Tables are built as explicit
//! ordered column lists; a duplicate column name is a synthesis error, never
//! a silent overwrite.

use heck::ToSnakeCase;
use serde::{Deserialize, Serialize};
use strata_core::{
    Cardinality, ColumnType, DatabaseType, ReferentialAction, StrataError, StrataResult,
};
use strata_ir::{ContentType, DefaultValue, FieldDescriptor, FieldKind, TypeRegistry};

use crate::resolver::{JoinTableIdentity, RelationGraph};

/// Default length for string columns without an explicit bound
const DEFAULT_VARCHAR_LEN: u32 = 255;

// ============================================================================
// Column
// ============================================================================

/// One column of a generated table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name (snake_case)
    pub name: String,

    /// Storage type
    pub column_type: ColumnType,

    /// NOT NULL
    pub required: bool,

    /// Uniquely constrained (implies an index)
    pub unique: bool,

    /// Non-unique index requested
    pub indexed: bool,

    /// Auto-incrementing (serial identifiers only)
    pub auto_increment: bool,

    /// Default value, rendered into the DDL
    pub default: Option<DefaultValue>,

    /// Foreign-key reference, if any
    pub references: Option<ForeignKey>,
}

impl Column {
    /// Create a plain column
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            required: false,
            unique: false,
            indexed: false,
            auto_increment: false,
            default: None,
            references: None,
        }
    }

    /// Render the column definition line for a CREATE TABLE statement
    pub fn to_sql(&self, db: DatabaseType) -> String {
        let mut sql = format!("{} {}", self.name, self.type_sql(db));
        if self.required {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default {
            sql.push_str(&format!(" DEFAULT {}", default.to_sql(db)));
        }
        sql
    }

    fn type_sql(&self, db: DatabaseType) -> String {
        if self.auto_increment {
            return match db {
                DatabaseType::PostgreSQL => "BIGSERIAL".to_string(),
                DatabaseType::MySQL => "BIGINT AUTO_INCREMENT".to_string(),
                DatabaseType::SQLite => "INTEGER".to_string(),
            };
        }
        self.column_type.to_sql(db)
    }
}

/// Foreign-key reference carried by a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table name
    pub table: String,

    /// Referenced column name (the target's identifier column)
    pub column: String,

    /// Action on delete of the referenced row
    pub on_delete: ReferentialAction,

    /// Action on update of the referenced identifier
    pub on_update: ReferentialAction,
}

impl ForeignKey {
    /// Render the table-level constraint line
    pub fn to_sql(&self, table: &str, column: &str) -> String {
        format!(
            "CONSTRAINT fk_{table}_{column} FOREIGN KEY ({column}) REFERENCES {ref_table}({ref_column}) ON DELETE {on_delete} ON UPDATE {on_update}",
            table = table,
            column = column,
            ref_table = self.table,
            ref_column = self.column,
            on_delete = self.on_delete.to_sql(),
            on_update = self.on_update.to_sql(),
        )
    }
}

// ============================================================================
// Table
// ============================================================================

/// Kind of a generated table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// One row per record of a content type
    Base,
    /// Two foreign keys materializing a many-to-many edge
    Join,
}

/// A generated table: ordered columns plus the primary-key column set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Base or join table
    pub kind: TableKind,

    /// Columns in derivation order
    pub columns: Vec<Column>,

    /// Primary-key column names (one for base tables, two for join tables)
    pub primary_key: Vec<String>,
}

impl Table {
    fn new(name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            name: name.into(),
            kind,
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Append a column, rejecting duplicate names
    fn push_column(&mut self, column: Column) -> StrataResult<()> {
        if self.column(&column.name).is_some() {
            return Err(StrataError::DuplicateColumn {
                table: self.name.clone(),
                column: column.name,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    /// Render the full CREATE TABLE statement plus index statements
    pub fn to_sql(&self, db: DatabaseType) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.to_sql(db)))
            .collect();

        if !self.primary_key.is_empty() {
            lines.push(format!("    PRIMARY KEY ({})", self.primary_key.join(", ")));
        }

        for column in &self.columns {
            if let Some(fk) = &column.references {
                lines.push(format!("    {}", fk.to_sql(&self.name, &column.name)));
            }
        }

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);\n",
            self.name,
            lines.join(",\n")
        );

        // Non-unique secondary indexes; UNIQUE is declared inline above
        for column in &self.columns {
            let is_pk = self.primary_key.contains(&column.name);
            if column.indexed && !column.unique && !is_pk {
                sql.push_str(&format!(
                    "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {} ({});\n",
                    self.name, column.name, self.name, column.name
                ));
            }
        }

        sql
    }
}

// ============================================================================
// RelationMeta
// ============================================================================

/// Relationship-graph metadata emitted per base table, for downstream
/// eager-loading of related records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationMeta {
    /// Relation name as exposed on this type
    pub name: String,

    /// Table holding the related records
    pub target_table: String,

    /// Cardinality as seen from this type
    pub cardinality: Cardinality,

    /// Key column on this table (`id`, or the FK column for owned edges)
    pub local_column: String,

    /// Matching column on the target (or join) side, when determinable
    pub foreign_column: Option<String>,

    /// Join table id, for many-to-many relations
    pub via: Option<String>,
}

// ============================================================================
// SchemaArtifact
// ============================================================================

/// The schema synthesis result for one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaArtifact {
    /// The content type's base table
    pub base_table: Table,

    /// Join tables this type participates in, ordered by table name.
    /// The same join table appears in both participants' artifacts; global
    /// output deduplicates by name.
    pub join_tables: Vec<Table>,

    /// Relationship metadata for this type, declared edges first
    pub relations: Vec<RelationMeta>,
}

// ============================================================================
// Synthesis
// ============================================================================

/// Derive the storage schema for one content type.
///
/// Pure function of the descriptor set and the resolved graph; the same
/// input always yields byte-identical output (same column order, same
/// names).
pub fn synthesize_schema(
    ct: &ContentType,
    registry: &TypeRegistry,
    graph: &RelationGraph,
) -> StrataResult<SchemaArtifact> {
    let mut table = Table::new(ct.table_name(), TableKind::Base);

    for field in &ct.fields {
        if let Some(column) = derive_column(ct, field, registry)? {
            table.push_column(column)?;
        }
    }

    // Timestamp and soft-delete columns occupy fixed trailing positions
    if ct.timestamps {
        let mut created = Column::new("created_at", ColumnType::DateTime);
        created.required = true;
        created.default = Some(DefaultValue::Now);
        table.push_column(created)?;

        let mut updated = Column::new("updated_at", ColumnType::DateTime);
        updated.required = true;
        updated.default = Some(DefaultValue::Now);
        table.push_column(updated)?;
    }
    if ct.soft_delete {
        table.push_column(Column::new("deleted_at", ColumnType::DateTime))?;
    }

    table.primary_key = vec!["id".to_string()];

    let join_tables = graph
        .join_tables_for(&ct.api_id)
        .into_iter()
        .map(|identity| synthesize_join_table(identity, registry))
        .collect::<StrataResult<Vec<_>>>()?;

    let relations = graph
        .edges_for(&ct.api_id)
        .iter()
        .map(|edge| {
            let target = registry.require(&edge.to_type)?;
            Ok(RelationMeta {
                name: edge.name.clone(),
                target_table: target.table_name(),
                cardinality: edge.cardinality,
                local_column: if edge.owns_column() {
                    fk_column_name(edge.fk_field.as_deref().unwrap_or(&edge.name))
                } else {
                    "id".to_string()
                },
                foreign_column: if edge.owns_column() {
                    Some("id".to_string())
                } else if edge.join_table.is_some() {
                    Some("id".to_string())
                } else {
                    edge.fk_field.as_deref().map(fk_column_name)
                },
                via: edge.join_table.clone(),
            })
        })
        .collect::<StrataResult<Vec<_>>>()?;

    Ok(SchemaArtifact {
        base_table: table,
        join_tables,
        relations,
    })
}

/// Derive the column for one field, or `None` when the field stores no
/// column on the base table (plural relations)
fn derive_column(
    ct: &ContentType,
    field: &FieldDescriptor,
    registry: &TypeRegistry,
) -> StrataResult<Option<Column>> {
    let mut column = match &field.kind {
        FieldKind::Identifier { strategy } => {
            let mut column = Column::new("id", strategy.column_type());
            column.required = true;
            column.auto_increment = strategy.generated_by_storage();
            column
        }
        FieldKind::Text { max_length, .. } => {
            if field.localized {
                // One value per locale, stored as a structured blob
                Column::new(field.api_id.to_snake_case(), ColumnType::Json)
            } else {
                let len = max_length
                    .map(|n| n as u32)
                    .unwrap_or(DEFAULT_VARCHAR_LEN);
                Column::new(field.api_id.to_snake_case(), ColumnType::VarChar(len))
            }
        }
        FieldKind::RichText => {
            let ty = if field.localized {
                ColumnType::Json
            } else {
                ColumnType::Text
            };
            Column::new(field.api_id.to_snake_case(), ty)
        }
        FieldKind::Number { shape, .. } => {
            let ty = match shape {
                strata_ir::NumberShape::Integer => ColumnType::BigInt,
                strata_ir::NumberShape::Float => ColumnType::Double,
            };
            Column::new(field.api_id.to_snake_case(), ty)
        }
        FieldKind::Boolean => Column::new(field.api_id.to_snake_case(), ColumnType::Boolean),
        FieldKind::Date { with_time } => {
            let ty = if *with_time {
                ColumnType::DateTime
            } else {
                ColumnType::Date
            };
            Column::new(field.api_id.to_snake_case(), ty)
        }
        FieldKind::Relation(opts) => {
            if !opts.cardinality.owns_column() {
                // Plural relations materialize as a join table (m2m) or as
                // the other side's FK column (o2m); no column here
                return Ok(None);
            }

            let target = registry.get(&opts.related_type).ok_or_else(|| {
                StrataError::DanglingRelation {
                    content_type: ct.api_id.clone(),
                    field: field.api_id.clone(),
                    target: opts.related_type.clone(),
                }
            })?;
            let strategy =
                target
                    .id_strategy()
                    .ok_or_else(|| StrataError::UnresolvableIdStrategy {
                        content_type: ct.api_id.clone(),
                        field: field.api_id.clone(),
                        target: opts.related_type.clone(),
                    })?;

            let mut column = Column::new(fk_column_name(&field.api_id), strategy.column_type());
            column.indexed = true;
            column.unique = opts.cardinality == Cardinality::OneToOne || field.unique;
            column.references = Some(ForeignKey {
                table: target.table_name(),
                column: "id".to_string(),
                on_delete: opts.on_delete,
                on_update: opts.on_update,
            });
            column
        }
        FieldKind::Media => Column::new(
            field.api_id.to_snake_case(),
            ColumnType::VarChar(DEFAULT_VARCHAR_LEN),
        ),
        FieldKind::Json => Column::new(field.api_id.to_snake_case(), ColumnType::Json),
    };

    if !field.is_identifier() {
        column.required = field.required;
        column.unique = column.unique || field.unique;
        column.indexed = column.indexed || field.indexed;
        column.default = field.default_value.clone();
    }

    Ok(Some(column))
}

/// Build the table for one join-table identity.
///
/// The shape is fully determined by the identity: two foreign-key columns
/// named after the sorted type pair, composite primary key over both, no
/// other columns. Self-referential pairs prefix the second column with
/// `related_` to keep the key well-formed.
pub fn synthesize_join_table(
    identity: &JoinTableIdentity,
    registry: &TypeRegistry,
) -> StrataResult<Table> {
    let mut table = Table::new(&identity.id, TableKind::Join);

    let left_column = join_fk_column(registry, &identity.id, &identity.left, None)?;
    let right_prefix = (identity.left == identity.right).then_some("related_");
    let right_column = join_fk_column(registry, &identity.id, &identity.right, right_prefix)?;

    table.primary_key = vec![left_column.name.clone(), right_column.name.clone()];
    table.push_column(left_column)?;
    table.push_column(right_column)?;

    Ok(table)
}

fn join_fk_column(
    registry: &TypeRegistry,
    join_table: &str,
    api_id: &str,
    prefix: Option<&str>,
) -> StrataResult<Column> {
    let ct = registry.require(api_id)?;
    let strategy = ct
        .id_strategy()
        .ok_or_else(|| StrataError::UnresolvableIdStrategy {
            content_type: join_table.to_string(),
            field: api_id.to_string(),
            target: api_id.to_string(),
        })?;

    let name = format!(
        "{}{}",
        prefix.unwrap_or(""),
        fk_column_name(api_id)
    );
    let mut column = Column::new(name, strategy.column_type());
    column.required = true;
    column.indexed = true;
    column.references = Some(ForeignKey {
        table: ct.table_name(),
        column: "id".to_string(),
        // Join rows have no life of their own
        on_delete: ReferentialAction::Cascade,
        on_update: ReferentialAction::Cascade,
    });
    Ok(column)
}

/// Foreign-key column name for a field or type api id: `{snake}_id`
pub fn fk_column_name(api_id: &str) -> String {
    format!("{}_id", api_id.to_snake_case())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_relations;
    use strata_core::IdStrategy;

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
                    .with_display_field("title"),
            )
    }

    fn synthesize(registry: &TypeRegistry, api_id: &str) -> SchemaArtifact {
        let graph = resolve_relations(registry).unwrap();
        synthesize_schema(registry.get(api_id).unwrap(), registry, &graph).unwrap()
    }

    #[test]
    fn test_post_base_table_shape() {
        let registry = blog_registry();
        let artifact = synthesize(&registry, "post");
        let table = &artifact.base_table;

        assert_eq!(table.name, "post");
        assert_eq!(table.kind, TableKind::Base);
        assert_eq!(
            table.column_names(),
            vec!["id", "title", "author_id", "created_at", "updated_at"]
        );
        assert_eq!(table.primary_key, vec!["id"]);

        let author = table.column("author_id").unwrap();
        assert!(author.required);
        assert!(author.indexed);
        let fk = author.references.as_ref().unwrap();
        assert_eq!(fk.table, "user");
        assert_eq!(fk.column, "id");
        assert_eq!(fk.on_delete, ReferentialAction::NoAction);
    }

    #[test]
    fn test_unique_field_column() {
        let registry = blog_registry();
        let artifact = synthesize(&registry, "user");
        let email = artifact.base_table.column("email").unwrap();
        assert!(email.unique);
        assert!(email.indexed);
        assert!(email.required);
        assert_eq!(email.column_type, ColumnType::VarChar(255));
    }

    #[test]
    fn test_identifier_strategies() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::with_id_strategy("page", IdStrategy::Serial));
        let artifact = synthesize(&registry, "page");
        let id = artifact.base_table.column("id").unwrap();
        assert_eq!(id.column_type, ColumnType::BigInt);
        assert!(id.auto_increment);
        assert_eq!(
            id.to_sql(DatabaseType::PostgreSQL),
            "id BIGSERIAL NOT NULL"
        );
    }

    #[test]
    fn test_fk_column_adopts_target_id_type() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::with_id_strategy("page", IdStrategy::Serial))
            .with(ContentType::new("block").with_field(FieldDescriptor::relation(
                "page",
                "page",
                Cardinality::ManyToOne,
            )));
        let artifact = synthesize(&registry, "block");
        let fk = artifact.base_table.column("page_id").unwrap();
        assert_eq!(fk.column_type, ColumnType::BigInt);
        assert!(!fk.auto_increment);
    }

    #[test]
    fn test_one_to_one_fk_is_unique() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::new("user"))
            .with(ContentType::new("profile").with_field(FieldDescriptor::relation(
                "owner",
                "user",
                Cardinality::OneToOne,
            )));
        let artifact = synthesize(&registry, "profile");
        assert!(artifact.base_table.column("owner_id").unwrap().unique);
    }

    #[test]
    fn test_localized_text_stored_as_json() {
        let registry = TypeRegistry::new("t").with(
            ContentType::new("page")
                .with_field(FieldDescriptor::text("title").localized().required()),
        );
        let artifact = synthesize(&registry, "page");
        let title = artifact.base_table.column("title").unwrap();
        assert_eq!(title.column_type, ColumnType::Json);
    }

    #[test]
    fn test_soft_delete_column_positioning() {
        let registry = TypeRegistry::new("t").with(
            ContentType::new("doc")
                .soft_delete()
                .with_field(FieldDescriptor::text("title")),
        );
        let artifact = synthesize(&registry, "doc");
        assert_eq!(
            artifact.base_table.column_names(),
            vec!["id", "title", "created_at", "updated_at", "deleted_at"]
        );
        let deleted = artifact.base_table.column("deleted_at").unwrap();
        assert!(!deleted.required);
    }

    #[test]
    fn test_without_timestamps() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::new("doc").without_timestamps());
        let artifact = synthesize(&registry, "doc");
        assert_eq!(artifact.base_table.column_names(), vec!["id"]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        // A declared field colliding with the relation's derived FK column
        let registry = TypeRegistry::new("t")
            .with(ContentType::new("user"))
            .with(
                ContentType::new("post")
                    .with_field(FieldDescriptor::text("author_id"))
                    .with_field(FieldDescriptor::relation(
                        "author",
                        "user",
                        Cardinality::ManyToOne,
                    )),
            );
        let graph = resolve_relations(&registry).unwrap();
        let err =
            synthesize_schema(registry.get("post").unwrap(), &registry, &graph).unwrap_err();
        assert!(matches!(err, StrataError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_join_table_shape() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::new("post").with_field(FieldDescriptor::relation(
                "tags",
                "tag",
                Cardinality::ManyToMany,
            )))
            .with(ContentType::new("tag"));

        let artifact = synthesize(&registry, "post");
        assert_eq!(artifact.join_tables.len(), 1);

        let join = &artifact.join_tables[0];
        assert_eq!(join.name, "post_to_tag");
        assert_eq!(join.kind, TableKind::Join);
        assert_eq!(join.column_names(), vec!["post_id", "tag_id"]);
        assert_eq!(join.primary_key, vec!["post_id", "tag_id"]);
        assert!(join.columns.iter().all(|c| c.required));
        assert!(join.columns.iter().all(|c| c.references.is_some()));
    }

    #[test]
    fn test_join_table_identical_from_either_side() {
        let registry = TypeRegistry::new("t")
            .with(ContentType::new("post").with_field(FieldDescriptor::relation(
                "tags",
                "tag",
                Cardinality::ManyToMany,
            )))
            .with(ContentType::new("tag").with_field(FieldDescriptor::relation(
                "entries",
                "post",
                Cardinality::ManyToMany,
            )));

        let from_post = synthesize(&registry, "post");
        let from_tag = synthesize(&registry, "tag");
        assert_eq!(from_post.join_tables, from_tag.join_tables);
    }

    #[test]
    fn test_self_referential_join_table() {
        let registry = TypeRegistry::new("t").with(
            ContentType::new("user").with_field(FieldDescriptor::relation(
                "follows",
                "user",
                Cardinality::ManyToMany,
            )),
        );
        let artifact = synthesize(&registry, "user");
        let join = &artifact.join_tables[0];
        assert_eq!(join.column_names(), vec!["user_id", "related_user_id"]);
    }

    #[test]
    fn test_relation_metadata() {
        let registry = blog_registry();
        let graph = resolve_relations(&registry).unwrap();

        let post = synthesize(&registry, "post");
        let author = post.relations.iter().find(|r| r.name == "author").unwrap();
        assert_eq!(author.target_table, "user");
        assert_eq!(author.local_column, "author_id");
        assert_eq!(author.foreign_column.as_deref(), Some("id"));
        assert!(author.via.is_none());

        // The synthesized inverse carries the FK column on the target side
        let user = synthesize_schema(registry.get("user").unwrap(), &registry, &graph).unwrap();
        let posts = user.relations.iter().find(|r| r.name == "posts").unwrap();
        assert_eq!(posts.cardinality, Cardinality::OneToMany);
        assert_eq!(posts.local_column, "id");
        assert_eq!(posts.foreign_column.as_deref(), Some("author_id"));
    }

    #[test]
    fn test_table_sql_rendering() {
        let registry = blog_registry();
        let artifact = synthesize(&registry, "post");
        let sql = artifact.base_table.to_sql(DatabaseType::PostgreSQL);

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS post ("));
        assert!(sql.contains("id UUID NOT NULL"));
        assert!(sql.contains("title VARCHAR(255) NOT NULL"));
        assert!(sql.contains("author_id UUID NOT NULL"));
        assert!(sql.contains("PRIMARY KEY (id)"));
        assert!(sql.contains(
            "CONSTRAINT fk_post_author_id FOREIGN KEY (author_id) REFERENCES user(id)"
        ));
        assert!(sql.contains("created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()"));
        // author_id is indexed but not unique
        assert!(sql.contains("CREATE INDEX IF NOT EXISTS idx_post_author_id"));
    }

    #[test]
    fn test_determinism() {
        let registry = blog_registry();
        let a = synthesize(&registry, "post");
        let b = synthesize(&registry, "post");
        assert_eq!(a, b);
        assert_eq!(
            a.base_table.to_sql(DatabaseType::SQLite),
            b.base_table.to_sql(DatabaseType::SQLite)
        );
    }
}
