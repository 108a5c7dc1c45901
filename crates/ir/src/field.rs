//! Field descriptors
//!
//! This module contains the `FieldDescriptor` struct and the `FieldKind`
//! tagged union describing one typed, constrained attribute of a content
//! type. Descriptors are constructed once at declaration time and are
//! immutable thereafter; every synthesizer consumes them, none mutates them.

use serde::{Deserialize, Serialize};
use strata_core::{
    Cardinality, DatabaseType, IdStrategy, ReferentialAction, StrataError, StrataResult,
    Validatable,
};
use uuid::Uuid;

// ============================================================================
// FieldDescriptor
// ============================================================================

/// One field of a content type (maps to a column, a validation rule, and an
/// API field, all derived from this single declaration)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Unique identifier for this descriptor
    pub id: Uuid,

    /// API identifier, unique within its content type
    /// (pattern `[a-z][a-zA-Z0-9_]*`)
    pub api_id: String,

    /// Human-readable display name
    pub display_name: String,

    /// The field's kind with kind-specific options
    pub kind: FieldKind,

    /// Whether a value must be present (NOT NULL)
    pub required: bool,

    /// Whether values must be unique across rows
    pub unique: bool,

    /// Whether the field holds one value per configured locale
    pub localized: bool,

    /// Whether the field is hidden from default API output
    pub hidden: bool,

    /// Whether the field may be set at creation time
    pub creatable: bool,

    /// Whether the field may be changed after creation
    pub updatable: bool,

    /// Whether list operations may filter on this field
    pub filterable: bool,

    /// Whether list operations may sort on this field
    pub sortable: bool,

    /// Whether to create an index on the derived column
    pub indexed: bool,

    /// Default value, typed per kind
    pub default_value: Option<DefaultValue>,
}

impl FieldDescriptor {
    /// Create a new field with the given api id and kind
    pub fn new(api_id: impl Into<String>, kind: FieldKind) -> Self {
        let api_id = api_id.into();
        let display_name = to_title_case(&api_id);

        Self {
            id: Uuid::new_v4(),
            api_id,
            display_name,
            kind,
            required: false,
            unique: false,
            localized: false,
            hidden: false,
            creatable: true,
            updatable: true,
            filterable: false,
            sortable: false,
            indexed: false,
            default_value: None,
        }
    }

    /// Create the identifier field (fixed api id `id`)
    pub fn identifier(strategy: IdStrategy) -> Self {
        let mut field = Self::new("id", FieldKind::Identifier { strategy });
        field.display_name = "ID".to_string();
        field.required = true;
        field.unique = true;
        field.indexed = true;
        field.creatable = false;
        field.updatable = false;
        field.sortable = true;
        field
    }

    /// Create a plain text field
    pub fn text(api_id: impl Into<String>) -> Self {
        Self::new(
            api_id,
            FieldKind::Text {
                variant: TextVariant::Plain,
                min_length: None,
                max_length: None,
                pattern: None,
            },
        )
    }

    /// Create a slug text field (lowercase alphanumerics, internal hyphens)
    pub fn slug(api_id: impl Into<String>) -> Self {
        let mut field = Self::new(
            api_id,
            FieldKind::Text {
                variant: TextVariant::Slug,
                min_length: None,
                max_length: None,
                pattern: None,
            },
        );
        field.unique = true;
        field.indexed = true;
        field
    }

    /// Create a rich text field
    pub fn rich_text(api_id: impl Into<String>) -> Self {
        Self::new(api_id, FieldKind::RichText)
    }

    /// Create an integer number field
    pub fn integer(api_id: impl Into<String>) -> Self {
        Self::new(
            api_id,
            FieldKind::Number {
                shape: NumberShape::Integer,
                min: None,
                max: None,
            },
        )
    }

    /// Create a floating-point number field
    pub fn float(api_id: impl Into<String>) -> Self {
        Self::new(
            api_id,
            FieldKind::Number {
                shape: NumberShape::Float,
                min: None,
                max: None,
            },
        )
    }

    /// Create a boolean field
    pub fn boolean(api_id: impl Into<String>) -> Self {
        Self::new(api_id, FieldKind::Boolean)
    }

    /// Create a date-only field
    pub fn date(api_id: impl Into<String>) -> Self {
        Self::new(api_id, FieldKind::Date { with_time: false })
    }

    /// Create a date-time field
    pub fn date_time(api_id: impl Into<String>) -> Self {
        Self::new(api_id, FieldKind::Date { with_time: true })
    }

    /// Create a relation field toward another content type
    pub fn relation(
        api_id: impl Into<String>,
        related_type: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self::new(
            api_id,
            FieldKind::Relation(RelationOptions::new(related_type, cardinality)),
        )
    }

    /// Create a media reference field
    pub fn media(api_id: impl Into<String>) -> Self {
        Self::new(api_id, FieldKind::Media)
    }

    /// Create a JSON field
    pub fn json(api_id: impl Into<String>) -> Self {
        Self::new(api_id, FieldKind::Json)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self.indexed = true; // unique fields are always indexed
        self
    }

    /// Mark the field as localized
    pub fn localized(mut self) -> Self {
        self.localized = true;
        self
    }

    /// Mark the field as hidden
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Exclude the field from the create shape
    pub fn not_creatable(mut self) -> Self {
        self.creatable = false;
        self
    }

    /// Exclude the field from the update shape
    pub fn not_updatable(mut self) -> Self {
        self.updatable = false;
        self
    }

    /// Mark the field as filterable
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Mark the field as sortable
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark the field as indexed
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    /// Set a default value
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default_value = Some(default);
        self
    }

    /// Set length bounds (text fields only; ignored for other kinds)
    pub fn with_length(mut self, min: Option<usize>, max: Option<usize>) -> Self {
        if let FieldKind::Text {
            min_length,
            max_length,
            ..
        } = &mut self.kind
        {
            *min_length = min;
            *max_length = max;
        }
        self
    }

    /// Set numeric bounds (number fields only; ignored for other kinds)
    pub fn with_bounds(mut self, lo: Option<f64>, hi: Option<f64>) -> Self {
        if let FieldKind::Number { min, max, .. } = &mut self.kind {
            *min = lo;
            *max = hi;
        }
        self
    }

    /// Set referential actions (relation fields only; ignored otherwise)
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        if let FieldKind::Relation(opts) = &mut self.kind {
            opts.on_delete = action;
        }
        self
    }

    /// Set on-update action (relation fields only; ignored otherwise)
    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        if let FieldKind::Relation(opts) = &mut self.kind {
            opts.on_update = action;
        }
        self
    }

    /// Name the synthesized inverse relation (relation fields only)
    pub fn with_inverse_name(mut self, name: impl Into<String>) -> Self {
        if let FieldKind::Relation(opts) = &mut self.kind {
            opts.inverse_name = Some(name.into());
        }
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Check if this is the identifier field
    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, FieldKind::Identifier { .. })
    }

    /// Check if this is a relation field
    pub fn is_relation(&self) -> bool {
        matches!(self.kind, FieldKind::Relation(_))
    }

    /// Get the relation options, if this is a relation field
    pub fn relation_options(&self) -> Option<&RelationOptions> {
        match &self.kind {
            FieldKind::Relation(opts) => Some(opts),
            _ => None,
        }
    }

    /// Get the identifier strategy, if this is the identifier field
    pub fn id_strategy(&self) -> Option<IdStrategy> {
        match self.kind {
            FieldKind::Identifier { strategy } => Some(strategy),
            _ => None,
        }
    }

    /// Whether the schema synthesizer emits a scalar column for this field
    /// (relations with plural cardinality and one-to-many inverses do not)
    pub fn stores_column(&self) -> bool {
        match &self.kind {
            FieldKind::Relation(opts) => opts.cardinality.owns_column(),
            _ => true,
        }
    }
}

impl Validatable for FieldDescriptor {
    fn validate(&self) -> StrataResult<()> {
        if self.api_id.is_empty() {
            return Err(StrataError::validation("Field api id cannot be empty"));
        }

        if !is_valid_api_id(&self.api_id) {
            return Err(StrataError::validation(format!(
                "Field api id '{}' must match [a-z][a-zA-Z0-9_]*",
                self.api_id
            )));
        }

        match &self.kind {
            FieldKind::Identifier { .. } => {
                if self.api_id != "id" {
                    return Err(StrataError::validation(format!(
                        "Identifier field must have api id 'id', found '{}'",
                        self.api_id
                    )));
                }
                if self.localized {
                    return Err(StrataError::validation(
                        "Identifier field cannot be localized",
                    ));
                }
            }
            FieldKind::Relation(opts) => {
                if opts.related_type.is_empty() {
                    return Err(StrataError::validation(format!(
                        "Relation field '{}' must name a related content type",
                        self.api_id
                    )));
                }
                if self.localized {
                    return Err(StrataError::validation(format!(
                        "Relation field '{}' cannot be localized",
                        self.api_id
                    )));
                }
            }
            FieldKind::Text {
                min_length,
                max_length,
                ..
            } => {
                if let (Some(min), Some(max)) = (min_length, max_length)
                    && min > max
                {
                    return Err(StrataError::validation(format!(
                        "Field '{}' has min length {} greater than max length {}",
                        self.api_id, min, max
                    )));
                }
            }
            FieldKind::Number { min, max, .. } => {
                if let (Some(lo), Some(hi)) = (min, max)
                    && lo > hi
                {
                    return Err(StrataError::validation(format!(
                        "Field '{}' has min {} greater than max {}",
                        self.api_id, lo, hi
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FieldDescriptor {}

// ============================================================================
// FieldKind
// ============================================================================

/// Kind of a field with kind-specific options
///
/// A sum type so every synthesizer matches exhaustively: adding a new kind
/// is a compile error wherever it is unhandled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    /// The primary identifier; exactly one per content type
    Identifier { strategy: IdStrategy },
    /// Short text with optional length bounds and pattern
    Text {
        variant: TextVariant,
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<String>,
    },
    /// Long-form rich text
    RichText,
    /// Numeric value, integer or floating point
    Number {
        shape: NumberShape,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Boolean true/false
    Boolean,
    /// Date, with or without a time component
    Date { with_time: bool },
    /// Link to another content type
    Relation(RelationOptions),
    /// Opaque media reference
    Media,
    /// Arbitrary JSON blob
    Json,
}

impl FieldKind {
    /// Get a user-friendly display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldKind::Identifier { .. } => "Identifier",
            FieldKind::Text { .. } => "Text",
            FieldKind::RichText => "Rich Text",
            FieldKind::Number { .. } => "Number",
            FieldKind::Boolean => "Boolean",
            FieldKind::Date { with_time: false } => "Date",
            FieldKind::Date { with_time: true } => "Date & Time",
            FieldKind::Relation(_) => "Relation",
            FieldKind::Media => "Media",
            FieldKind::Json => "JSON",
        }
    }
}

/// Variant of a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextVariant {
    /// Free-form short text
    #[default]
    Plain,
    /// URL-safe slug; gains a fixed format constraint
    Slug,
}

/// Storage shape of a number field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NumberShape {
    /// 64-bit signed integer
    #[default]
    Integer,
    /// 64-bit floating point
    Float,
}

// ============================================================================
// RelationOptions
// ============================================================================

/// Options carried by a relation field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationOptions {
    /// Api id of the related content type
    pub related_type: String,

    /// Cardinality of the relation as seen from the declaring side
    pub cardinality: Cardinality,

    /// Referential action on delete of the related row
    pub on_delete: ReferentialAction,

    /// Referential action on update of the related row's identifier
    pub on_update: ReferentialAction,

    /// Explicit name for the synthesized inverse relation. When absent the
    /// inverse is named by appending `s` to the declaring type's api id.
    pub inverse_name: Option<String>,
}

impl RelationOptions {
    /// Create relation options with default referential actions
    pub fn new(related_type: impl Into<String>, cardinality: Cardinality) -> Self {
        Self {
            related_type: related_type.into(),
            cardinality,
            on_delete: ReferentialAction::NoAction,
            on_update: ReferentialAction::NoAction,
            inverse_name: None,
        }
    }
}

// ============================================================================
// DefaultValue
// ============================================================================

/// Default values for fields, typed per kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// String value
    String(String),
    /// Current timestamp (NOW())
    Now,
    /// Empty JSON object
    EmptyObject,
}

impl DefaultValue {
    /// Convert to SQL representation
    pub fn to_sql(&self, db: DatabaseType) -> String {
        match self {
            DefaultValue::Bool(v) => match db {
                DatabaseType::MySQL | DatabaseType::SQLite => {
                    if *v { "1" } else { "0" }.to_string()
                }
                DatabaseType::PostgreSQL => v.to_string().to_uppercase(),
            },
            DefaultValue::Int(v) => v.to_string(),
            DefaultValue::Float(v) => v.to_string(),
            DefaultValue::String(v) => format!("'{}'", v.replace('\'', "''")),
            DefaultValue::Now => match db {
                DatabaseType::SQLite => "CURRENT_TIMESTAMP".to_string(),
                _ => "NOW()".to_string(),
            },
            DefaultValue::EmptyObject => "'{}'".to_string(),
        }
    }

    /// Convert to a JSON value for artifact output
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DefaultValue::Bool(v) => serde_json::Value::Bool(*v),
            DefaultValue::Int(v) => serde_json::Value::from(*v),
            DefaultValue::Float(v) => serde_json::Value::from(*v),
            DefaultValue::String(v) => serde_json::Value::String(v.clone()),
            DefaultValue::Now => serde_json::Value::String("$now".to_string()),
            DefaultValue::EmptyObject => serde_json::json!({}),
        }
    }
}

impl std::fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Bool(v) => write!(f, "{}", v),
            DefaultValue::Int(v) => write!(f, "{}", v),
            DefaultValue::Float(v) => write!(f, "{}", v),
            DefaultValue::String(v) => write!(f, "\"{}\"", v),
            DefaultValue::Now => write!(f, "NOW()"),
            DefaultValue::EmptyObject => write!(f, "{{}}"),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Check a string against the api id pattern `[a-z][a-zA-Z0-9_]*`
pub fn is_valid_api_id(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Convert an api id to Title Case for default display names
fn to_title_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
