//! Content-type descriptors
//!
//! A `ContentType` is an ordered collection of field descriptors plus
//! entity-level behavior flags (timestamps, soft delete). The full set of
//! content types is the sole input to every downstream synthesis step.

use crate::field::{FieldDescriptor, is_valid_api_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strata_core::{IdStrategy, Identifiable, Named, StrataError, StrataResult, Validatable};
use std::collections::HashSet;
use uuid::Uuid;

// ============================================================================
// ContentType
// ============================================================================

/// A declared entity kind (maps to one base table and one API resource)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentType {
    /// Unique identifier for this descriptor
    pub id: Uuid,

    /// API identifier, globally unique across the declaration set
    pub api_id: String,

    /// Human-readable display name
    pub display_name: String,

    /// Api id of the field used to label records in listings;
    /// must reference a field in `fields`
    pub display_field: String,

    /// Ordered field descriptors; insertion order determines generated
    /// column and validation-field ordering
    pub fields: Vec<FieldDescriptor>,

    /// Whether to append `created_at`/`updated_at` columns
    pub timestamps: bool,

    /// Whether to append a `deleted_at` column and filter deleted rows
    pub soft_delete: bool,

    /// Creation timestamp of the declaration
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp of the declaration
    pub modified_at: DateTime<Utc>,
}

impl ContentType {
    /// Create a new content type with a UUID identifier field
    pub fn new(api_id: impl Into<String>) -> Self {
        Self::with_id_strategy(api_id, IdStrategy::Uuid)
    }

    /// Create a new content type with a specific identifier strategy
    pub fn with_id_strategy(api_id: impl Into<String>, strategy: IdStrategy) -> Self {
        let api_id = api_id.into();
        let display_name = capitalize(&api_id);

        Self {
            id: Uuid::new_v4(),
            api_id,
            display_name,
            display_field: "id".to_string(),
            fields: vec![FieldDescriptor::identifier(strategy)],
            timestamps: true,
            soft_delete: false,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the display name
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the display field
    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.add_field(field);
        self
    }

    /// Disable timestamp columns
    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// Enable soft delete
    pub fn soft_delete(mut self) -> Self {
        self.soft_delete = true;
        self
    }

    // ========================================================================
    // Field management
    // ========================================================================

    /// Append a field, preserving declaration order
    pub fn add_field(&mut self, field: FieldDescriptor) {
        self.fields.push(field);
        self.touch();
    }

    /// Get a field by api id
    pub fn field(&self, api_id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.api_id == api_id)
    }

    /// Get the identifier field
    pub fn identifier_field(&self) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.is_identifier())
    }

    /// Get the identifier strategy
    pub fn id_strategy(&self) -> Option<IdStrategy> {
        self.identifier_field().and_then(|f| f.id_strategy())
    }

    /// All relation fields, in declaration order
    pub fn relation_fields(&self) -> Vec<&FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_relation()).collect()
    }

    /// Storage table name: snake_case of the api id
    pub fn table_name(&self) -> String {
        to_snake_case(&self.api_id)
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Validatable for ContentType {
    fn validate(&self) -> StrataResult<()> {
        if self.api_id.is_empty() {
            return Err(StrataError::validation("Content type api id cannot be empty"));
        }

        if !is_valid_api_id(&self.api_id) {
            return Err(StrataError::content_type_validation(
                &self.api_id,
                format!("api id '{}' must match [a-z][a-zA-Z0-9_]*", self.api_id),
            ));
        }

        // Field api ids must be unique within the type
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.api_id.as_str()) {
                return Err(StrataError::DuplicateField {
                    content_type: self.api_id.clone(),
                    field: field.api_id.clone(),
                });
            }
        }

        // Exactly one identifier field, with the fixed api id "id"
        let identifiers: Vec<_> = self.fields.iter().filter(|f| f.is_identifier()).collect();
        match identifiers.as_slice() {
            [only] if only.api_id == "id" => {}
            [] => {
                return Err(StrataError::content_type_validation(
                    &self.api_id,
                    "missing identifier field",
                ));
            }
            [only] => {
                return Err(StrataError::content_type_validation(
                    &self.api_id,
                    format!("identifier field must be named 'id', found '{}'", only.api_id),
                ));
            }
            _ => {
                return Err(StrataError::content_type_validation(
                    &self.api_id,
                    "more than one identifier field",
                ));
            }
        }

        // Display field must resolve to an existing field
        if self.field(&self.display_field).is_none() {
            return Err(StrataError::content_type_validation(
                &self.api_id,
                format!("display field '{}' does not exist", self.display_field),
            ));
        }

        // Each field must be structurally valid
        for field in &self.fields {
            field.validate().map_err(|e| {
                StrataError::field_validation(&self.api_id, &field.api_id, e.to_string())
            })?;
        }

        Ok(())
    }
}

impl Identifiable for ContentType {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Named for ContentType {
    fn api_id(&self) -> &str {
        &self.api_id
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContentType {}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert an api id to snake_case
fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_upper = false;

    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 && !prev_was_upper {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_was_upper = true;
        } else {
            result.push(c);
            prev_was_upper = false;
        }
    }

    result
}

/// Uppercase the first character
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

// ============================================================================
// Tests
// ============================================================================
