//! Core type vocabulary for Strata
//!
//! This module contains the shared vocabularies used by the descriptors and
//! every synthesizer: identifier strategies, column types with per-database
//! SQL rendering, relation cardinalities, referential actions, the
//! validation rule vocabulary, and locale configuration.

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifier Strategy
// ============================================================================

/// Primary key generation strategy for content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random opaque string (UUID v4, recommended)
    #[default]
    Uuid,
    /// Auto-incrementing integer
    Serial,
    /// Content-addressed string (hash of the row's initial content)
    Hash,
}

impl IdStrategy {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            IdStrategy::Uuid => "UUID",
            IdStrategy::Serial => "Serial (auto-increment)",
            IdStrategy::Hash => "Content hash",
        }
    }

    /// Column type used to store identifiers of this strategy
    pub fn column_type(&self) -> ColumnType {
        match self {
            IdStrategy::Uuid => ColumnType::Uuid,
            IdStrategy::Serial => ColumnType::BigInt,
            IdStrategy::Hash => ColumnType::VarChar(64),
        }
    }

    /// Validation rule matching identifiers of this strategy
    pub fn rule(&self) -> Rule {
        match self {
            IdStrategy::Uuid => Rule::String {
                min_length: Some(36),
                max_length: Some(36),
                pattern: None,
            },
            IdStrategy::Serial => Rule::Integer {
                min: Some(1),
                max: None,
            },
            IdStrategy::Hash => Rule::String {
                min_length: Some(1),
                max_length: Some(64),
                pattern: Some("^[0-9a-f]+$".to_string()),
            },
        }
    }

    /// Whether identifiers are generated by the storage engine itself
    pub fn generated_by_storage(&self) -> bool {
        matches!(self, IdStrategy::Serial)
    }

    /// Get all strategies
    pub fn all() -> &'static [IdStrategy] {
        &[IdStrategy::Uuid, IdStrategy::Serial, IdStrategy::Hash]
    }
}

impl std::fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Column Types
// ============================================================================

/// Storage column types emitted by the schema synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params")]
pub enum ColumnType {
    /// Variable-length string with a maximum length
    VarChar(u32),
    /// Long-form text content (TEXT/CLOB)
    Text,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    BigInt,
    /// 64-bit floating point
    Double,
    /// Boolean true/false
    Boolean,
    /// Date without time
    Date,
    /// Date and time with timezone
    DateTime,
    /// UUID (universally unique identifier)
    Uuid,
    /// JSON/JSONB data (also used for localized blobs)
    Json,
    /// Binary data (BYTEA/BLOB)
    Blob,
}

impl ColumnType {
    /// Convert to SQL type string for a specific database
    pub fn to_sql(&self, db: DatabaseType) -> String {
        match db {
            DatabaseType::PostgreSQL => self.to_postgres_type(),
            DatabaseType::MySQL => self.to_mysql_type(),
            DatabaseType::SQLite => self.to_sqlite_type(),
        }
    }

    /// Convert to PostgreSQL type
    pub fn to_postgres_type(&self) -> String {
        match self {
            ColumnType::VarChar(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "TIMESTAMP WITH TIME ZONE".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Json => "JSONB".to_string(),
            ColumnType::Blob => "BYTEA".to_string(),
        }
    }

    /// Convert to MySQL type
    pub fn to_mysql_type(&self) -> String {
        match self {
            ColumnType::VarChar(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "LONGTEXT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::BigInt => "BIGINT".to_string(),
            ColumnType::Double => "DOUBLE".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Uuid => "CHAR(36)".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Blob => "BLOB".to_string(),
        }
    }

    /// Convert to SQLite type
    pub fn to_sqlite_type(&self) -> String {
        match self {
            ColumnType::VarChar(_) | ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer | ColumnType::BigInt => "INTEGER".to_string(),
            ColumnType::Double => "REAL".to_string(),
            ColumnType::Boolean => "INTEGER".to_string(),
            ColumnType::Date | ColumnType::DateTime => "TEXT".to_string(),
            ColumnType::Uuid => "TEXT".to_string(),
            ColumnType::Json => "TEXT".to_string(),
            ColumnType::Blob => "BLOB".to_string(),
        }
    }

    /// Get a user-friendly display name
    pub fn display_name(&self) -> String {
        match self {
            ColumnType::VarChar(n) => format!("String({})", n),
            ColumnType::Text => "Text".to_string(),
            ColumnType::Integer => "Integer".to_string(),
            ColumnType::BigInt => "Big Integer".to_string(),
            ColumnType::Double => "Double".to_string(),
            ColumnType::Boolean => "Boolean".to_string(),
            ColumnType::Date => "Date".to_string(),
            ColumnType::DateTime => "DateTime".to_string(),
            ColumnType::Uuid => "UUID".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Blob => "Binary".to_string(),
        }
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Database Types
// ============================================================================

/// Supported target databases for DDL rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::MySQL => "MySQL",
            DatabaseType::SQLite => "SQLite",
        }
    }

    /// Parse from a CLI/config string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(DatabaseType::PostgreSQL),
            "mysql" | "mariadb" => Some(DatabaseType::MySQL),
            "sqlite" | "sqlite3" => Some(DatabaseType::SQLite),
            _ => None,
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Cardinality
// ============================================================================

/// Relation cardinality between two content types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    /// One record relates to exactly one other record
    OneToOne,
    /// Many records point at one (the declaring side owns the FK column)
    ManyToOne,
    /// One record relates to many others (the inverse of many-to-one)
    OneToMany,
    /// Many-to-many through a join table
    ManyToMany,
}

impl Cardinality {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "One to One",
            Cardinality::ManyToOne => "Many to One",
            Cardinality::OneToMany => "One to Many",
            Cardinality::ManyToMany => "Many to Many",
        }
    }

    /// Whether the declaring side stores a foreign-key column
    pub fn owns_column(&self) -> bool {
        matches!(self, Cardinality::OneToOne | Cardinality::ManyToOne)
    }

    /// Whether this cardinality materializes as a join table
    pub fn requires_join_table(&self) -> bool {
        matches!(self, Cardinality::ManyToMany)
    }

    /// Whether the declared field holds a collection of related records
    pub fn is_plural(&self) -> bool {
        matches!(self, Cardinality::OneToMany | Cardinality::ManyToMany)
    }

    /// Get the inverse cardinality
    pub fn inverse(&self) -> Self {
        match self {
            Cardinality::OneToOne => Cardinality::OneToOne,
            Cardinality::ManyToOne => Cardinality::OneToMany,
            Cardinality::OneToMany => Cardinality::ManyToOne,
            Cardinality::ManyToMany => Cardinality::ManyToMany,
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Referential Actions
// ============================================================================

/// Actions for foreign key constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    /// Delete related records when parent is deleted
    Cascade,
    /// Set foreign key to NULL when parent is deleted
    SetNull,
    /// Prevent deletion if related records exist
    Restrict,
    /// Do nothing (database default)
    #[default]
    NoAction,
    /// Set to default value
    SetDefault,
}

impl ReferentialAction {
    /// Get SQL keyword
    pub fn to_sql(&self) -> &'static str {
        match self {
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Get all referential actions
    pub fn all() -> &'static [ReferentialAction] {
        &[
            ReferentialAction::Cascade,
            ReferentialAction::SetNull,
            ReferentialAction::Restrict,
            ReferentialAction::NoAction,
            ReferentialAction::SetDefault,
        ]
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_sql())
    }
}

// ============================================================================
// Validation Rules
// ============================================================================

/// Validation rule vocabulary emitted by the validation synthesizer.
///
/// A concrete validation library (the adapter) turns each rule into a
/// checkable validator; the engine only declares the constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "params", rename_all = "snake_case")]
pub enum Rule {
    /// String with optional length bounds and regex pattern
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<String>,
    },
    /// URL-safe slug: lowercase alphanumerics and internal hyphens
    Slug,
    /// Rich text document (opaque structured text)
    RichText,
    /// Integer with optional bounds
    Integer { min: Option<i64>, max: Option<i64> },
    /// Floating point with optional bounds
    Float { min: Option<f64>, max: Option<f64> },
    /// Boolean true/false
    Boolean,
    /// Date without time (ISO 8601 date)
    Date,
    /// Date and time (RFC 3339)
    DateTime,
    /// Arbitrary JSON value
    Json,
    /// Opaque media reference
    Media,
    /// Value must be one of the listed variants
    Enum(Vec<String>),
    /// Object with named sub-rules (ordered)
    Object(Vec<RuleEntry>),
    /// Homogeneous collection of the inner rule
    Array(Box<Rule>),
    /// Inner rule, but the value may be absent
    Optional(Box<Rule>),
    /// Accepts anything; only emitted on the documented degraded path
    Any,
}

/// One named entry of an object rule or a ruleset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Field name as exposed by the API (camelCase)
    pub name: String,
    /// The rule to check
    pub rule: Rule,
    /// Whether the entry must be present
    pub required: bool,
}

impl RuleEntry {
    /// Create a required entry
    pub fn required(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: true,
        }
    }

    /// Create an optional entry
    pub fn optional(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
            required: false,
        }
    }
}

impl Rule {
    /// Pattern enforced by [`Rule::Slug`]
    pub const SLUG_PATTERN: &'static str = "^[a-z0-9]+(-[a-z0-9]+)*$";

    /// Unbounded string rule
    pub fn string() -> Self {
        Rule::String {
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }

    /// Unbounded integer rule
    pub fn integer() -> Self {
        Rule::Integer {
            min: None,
            max: None,
        }
    }

    /// Unbounded float rule
    pub fn float() -> Self {
        Rule::Float {
            min: None,
            max: None,
        }
    }

    /// Wrap this rule as optional (idempotent)
    pub fn optional(self) -> Self {
        match self {
            Rule::Optional(_) => self,
            other => Rule::Optional(Box::new(other)),
        }
    }

    /// Check whether the rule is wrapped as optional
    pub fn is_optional(&self) -> bool {
        matches!(self, Rule::Optional(_))
    }

    /// Unwrap one level of optionality, if present
    pub fn unwrap_optional(&self) -> &Rule {
        match self {
            Rule::Optional(inner) => inner,
            other => other,
        }
    }

    /// Get a user-friendly error message for a failed check
    pub fn error_message(&self) -> String {
        match self {
            Rule::String {
                min_length,
                max_length,
                pattern,
            } => match (min_length, max_length, pattern) {
                (Some(min), Some(max), _) => {
                    format!("Must be a string between {} and {} characters", min, max)
                }
                (Some(min), None, _) => format!("Must be a string of at least {} characters", min),
                (None, Some(max), _) => format!("Must be a string of at most {} characters", max),
                (None, None, Some(_)) => "Must match the required pattern".to_string(),
                (None, None, None) => "Must be a string".to_string(),
            },
            Rule::Slug => "Must be a lowercase slug (letters, digits, internal hyphens)".to_string(),
            Rule::RichText => "Must be a rich text document".to_string(),
            Rule::Integer { min, max } => match (min, max) {
                (Some(min), Some(max)) => format!("Must be an integer between {} and {}", min, max),
                (Some(min), None) => format!("Must be an integer of at least {}", min),
                (None, Some(max)) => format!("Must be an integer of at most {}", max),
                (None, None) => "Must be an integer".to_string(),
            },
            Rule::Float { .. } => "Must be a number".to_string(),
            Rule::Boolean => "Must be true or false".to_string(),
            Rule::Date => "Must be a date (YYYY-MM-DD)".to_string(),
            Rule::DateTime => "Must be an RFC 3339 date-time".to_string(),
            Rule::Json => "Must be a JSON value".to_string(),
            Rule::Media => "Must be a media reference".to_string(),
            Rule::Enum(variants) => format!("Must be one of: {}", variants.join(", ")),
            Rule::Object(_) => "Must be an object".to_string(),
            Rule::Array(inner) => format!("Must be a list ({})", inner.error_message()),
            Rule::Optional(inner) => inner.error_message(),
            Rule::Any => "Any value accepted".to_string(),
        }
    }
}

// ============================================================================
// Locale Configuration
// ============================================================================

/// Locale configuration for localized fields
///
/// The locale set and default locale are project configuration, not
/// per-field data. Localized fields expand into one sub-rule per locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Configured locale codes, in declaration order
    pub locales: Vec<String>,

    /// Locale that inherits a localized field's required-ness
    pub default_locale: String,
}

impl LocaleConfig {
    /// Create a locale configuration
    pub fn new(locales: Vec<String>, default_locale: impl Into<String>) -> Self {
        Self {
            locales,
            default_locale: default_locale.into(),
        }
    }

    /// Single-locale configuration
    pub fn single(locale: impl Into<String>) -> Self {
        let locale = locale.into();
        Self {
            locales: vec![locale.clone()],
            default_locale: locale,
        }
    }

    /// Check the configuration is internally consistent
    pub fn is_valid(&self) -> bool {
        !self.locales.is_empty() && self.locales.contains(&self.default_locale)
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::single("en")
    }
}

// ============================================================================
// Tests
// ============================================================================
