//! Core traits for Strata
//!
//! The fundamental traits that descriptors and artifacts implement for
//! validation, persistence, and identity.

use crate::error::StrataResult;
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can check their own structural invariants
///
/// Returns `Ok(())` if the value is internally consistent, or a
/// configuration error naming the offending element otherwise.
pub trait Validatable {
    /// Validate the current state of the object
    fn validate(&self) -> StrataResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types that round-trip through JSON declaration files
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the dot)
    fn file_extension() -> &'static str;

    /// Get the schema version for migration purposes
    fn schema_version() -> u32 {
        1
    }

    /// Save to a JSON string
    fn to_json(&self) -> StrataResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> StrataResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> StrataResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| crate::error::StrataError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> StrataResult<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| crate::error::StrataError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Identifiable Trait
// ============================================================================

/// Trait for types that have a UUID-based identity
pub trait Identifiable {
    /// Get the unique identifier
    fn id(&self) -> uuid::Uuid;

    /// Check if this matches another identifier
    fn matches_id(&self, id: uuid::Uuid) -> bool {
        self.id() == id
    }
}

// ============================================================================
// Named Trait
// ============================================================================

/// Trait for types addressed by a declared api id
pub trait Named {
    /// Get the api id
    fn api_id(&self) -> &str;

    /// Check if the api id matches (exact, case-sensitive)
    fn api_id_matches(&self, other: &str) -> bool {
        self.api_id() == other
    }
}

// ============================================================================
// Tests
// ============================================================================
