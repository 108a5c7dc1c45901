//! The type registry
//!
//! A `TypeRegistry` holds the complete, ordered set of content-type
//! descriptors. It is the sole input to relation resolution and every
//! synthesizer, and it round-trips through `.strata.json` declaration files.
//!
//! Artifacts are always looked up through the registry by descriptor
//! identity (uuid or declared api id), never through strings assembled at
//! the call site.

use crate::content_type::ContentType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strata_core::{Persistable, StrataError, StrataResult, Validatable};
use uuid::Uuid;

// ============================================================================
// TypeRegistry
// ============================================================================

/// The complete declaration set for one project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeRegistry {
    /// Declaration file schema version
    #[serde(default = "default_schema_version")]
    pub version: u32,

    /// Project name (used in generated artifact headers)
    pub name: String,

    /// Content types, in declaration order
    pub content_types: Vec<ContentType>,
}

fn default_schema_version() -> u32 {
    1
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            content_types: Vec::new(),
        }
    }

    // ========================================================================
    // Content-type management
    // ========================================================================

    /// Add a content type, rejecting duplicate api ids
    pub fn add(&mut self, content_type: ContentType) -> StrataResult<()> {
        if self.get(&content_type.api_id).is_some() {
            return Err(StrataError::DuplicateContentType(content_type.api_id));
        }
        self.content_types.push(content_type);
        Ok(())
    }

    /// Add a content type using the builder pattern
    ///
    /// # Panics
    ///
    /// Panics on duplicate api ids; intended for declaration-site use where
    /// duplicates are a programming error.
    pub fn with(mut self, content_type: ContentType) -> Self {
        self.add(content_type)
            .unwrap_or_else(|e| panic!("invalid declaration set: {}", e));
        self
    }

    /// Get a content type by api id
    pub fn get(&self, api_id: &str) -> Option<&ContentType> {
        self.content_types.iter().find(|ct| ct.api_id == api_id)
    }

    /// Get a content type by descriptor id
    pub fn get_by_id(&self, id: Uuid) -> Option<&ContentType> {
        self.content_types.iter().find(|ct| ct.id == id)
    }

    /// Get a content type by api id, or a not-found error
    pub fn require(&self, api_id: &str) -> StrataResult<&ContentType> {
        self.get(api_id)
            .ok_or_else(|| StrataError::ContentTypeNotFound(api_id.to_string()))
    }

    /// Check whether an api id is declared
    pub fn contains(&self, api_id: &str) -> bool {
        self.get(api_id).is_some()
    }

    /// Iterate content types in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ContentType> {
        self.content_types.iter()
    }

    /// Number of declared content types
    pub fn len(&self) -> usize {
        self.content_types.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.content_types.is_empty()
    }
}

impl Validatable for TypeRegistry {
    fn validate(&self) -> StrataResult<()> {
        if self.name.is_empty() {
            return Err(StrataError::validation("Project name cannot be empty"));
        }

        // Api ids must be globally unique
        let mut seen = HashSet::new();
        for ct in &self.content_types {
            if !seen.insert(ct.api_id.as_str()) {
                return Err(StrataError::DuplicateContentType(ct.api_id.clone()));
            }
        }

        // Each content type must be structurally valid
        for ct in &self.content_types {
            ct.validate()?;
        }

        Ok(())
    }
}

impl Persistable for TypeRegistry {
    fn file_extension() -> &'static str {
        "strata.json"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use strata_core::Cardinality;

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
                    .with_field(FieldDescriptor::relation(
                        "author",
                        "user",
                        Cardinality::ManyToOne,
                    ))
                    .with_display_field("title"),
            )
    }

    #[test]
    fn test_registry_lookups() {
        let registry = blog_registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("user"));
        assert!(registry.contains("post"));
        assert!(!registry.contains("comment"));

        let post = registry.get("post").unwrap();
        assert_eq!(registry.get_by_id(post.id).unwrap().api_id, "post");
    }

    #[test]
    fn test_require_unknown_type() {
        let registry = blog_registry();
        let err = registry.require("comment").unwrap_err();
        assert!(matches!(err, StrataError::ContentTypeNotFound(_)));
    }

    #[test]
    fn test_duplicate_api_id_rejected() {
        let mut registry = TypeRegistry::new("blog");
        registry.add(ContentType::new("post")).unwrap();
        let err = registry.add(ContentType::new("post")).unwrap_err();
        assert!(matches!(err, StrataError::DuplicateContentType(_)));
    }

    #[test]
    fn test_registry_validation() {
        assert!(blog_registry().validate().is_ok());

        let mut registry = blog_registry();
        registry.content_types[1].display_field = "missing".to_string();
        assert!(registry.validate().is_err());
    }

    #[test]
    fn test_declaration_order_preserved() {
        let registry = blog_registry();
        let ids: Vec<_> = registry.iter().map(|ct| ct.api_id.as_str()).collect();
        assert_eq!(ids, vec!["user", "post"]);
    }

    #[test]
    fn test_file_round_trip() {
        let registry = blog_registry();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.strata.json");

        registry.save_to_file(&path).unwrap();
        let loaded = TypeRegistry::load_from_file(&path).unwrap();

        assert_eq!(loaded.name, "blog");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("post").unwrap().fields.len(), 3);
        assert!(loaded.validate().is_ok());
    }
}
