//! Error types for Strata
//!
//! This module provides unified error handling across the scaffolding
//! engine. Configuration and synthesis errors are build-time faults that
//! abort artifact generation; `FailureSignal` is the separate, stable
//! vocabulary embedded in *generated* operation specs for runtime faults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for Strata
#[derive(Debug, Error)]
pub enum StrataError {
    // ========================================================================
    // Configuration Errors (malformed descriptors)
    // ========================================================================
    /// General validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Content-type validation failed
    #[error("Content type '{content_type}' is invalid: {message}")]
    ContentTypeValidation {
        content_type: String,
        message: String,
    },

    /// Field validation failed
    #[error("Field '{content_type}.{field}' is invalid: {message}")]
    FieldValidation {
        content_type: String,
        field: String,
        message: String,
    },

    /// A relation field references a content type that does not exist
    #[error("Relation '{content_type}.{field}' references unknown content type '{target}'")]
    DanglingRelation {
        content_type: String,
        field: String,
        target: String,
    },

    // ========================================================================
    // Not Found Errors
    // ========================================================================
    /// Content type not found
    #[error("Content type not found: {0}")]
    ContentTypeNotFound(String),

    /// Field not found
    #[error("Field '{field}' not found in content type '{content_type}'")]
    FieldNotFound {
        content_type: String,
        field: String,
    },

    /// Declaration file not found
    #[error("Declaration file not found at path: {0}")]
    DeclarationsNotFound(PathBuf),

    // ========================================================================
    // Duplicate Errors
    // ========================================================================
    /// Duplicate content-type api_id
    #[error("Duplicate content type: '{0}' is declared more than once")]
    DuplicateContentType(String),

    /// Duplicate field api_id within a content type
    #[error("Duplicate field: '{field}' is declared more than once in '{content_type}'")]
    DuplicateField {
        content_type: String,
        field: String,
    },

    /// Two derivations produced the same column name on one table
    #[error("Duplicate column '{column}' on table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// Two distinct type pairs mapped to the same join table id
    #[error("Join table id collision: '{join_table}' is produced by both {first} and {second}")]
    JoinTableCollision {
        join_table: String,
        first: String,
        second: String,
    },

    // ========================================================================
    // Synthesis Errors
    // ========================================================================
    /// Artifact synthesis failed
    #[error("Synthesis failed for '{content_type}': {message}")]
    Synthesis {
        content_type: String,
        message: String,
    },

    /// A relation target's identifier strategy could not be determined
    #[error(
        "Cannot resolve identifier strategy of '{target}' (referenced by '{content_type}.{field}')"
    )]
    UnresolvableIdStrategy {
        content_type: String,
        field: String,
        target: String,
    },

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Invalid declaration file format
    #[error("Invalid declaration file format: {0}")]
    InvalidDeclarationFormat(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl StrataError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        StrataError::Validation(msg.into())
    }

    /// Create a content-type validation error
    pub fn content_type_validation(
        content_type: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        StrataError::ContentTypeValidation {
            content_type: content_type.into(),
            message: msg.into(),
        }
    }

    /// Create a field validation error
    pub fn field_validation(
        content_type: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        StrataError::FieldValidation {
            content_type: content_type.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create a synthesis error
    pub fn synthesis(content_type: impl Into<String>, msg: impl Into<String>) -> Self {
        StrataError::Synthesis {
            content_type: content_type.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        StrataError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        StrataError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a configuration error (malformed input)
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            StrataError::Validation(_)
                | StrataError::ContentTypeValidation { .. }
                | StrataError::FieldValidation { .. }
                | StrataError::DanglingRelation { .. }
                | StrataError::DuplicateContentType(_)
                | StrataError::DuplicateField { .. }
                | StrataError::InvalidConfig(_)
                | StrataError::MissingConfig(_)
        )
    }

    /// Check if this error is a synthesis error
    pub fn is_synthesis(&self) -> bool {
        matches!(
            self,
            StrataError::Synthesis { .. }
                | StrataError::UnresolvableIdStrategy { .. }
                | StrataError::DuplicateColumn { .. }
                | StrataError::JoinTableCollision { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StrataError::ContentTypeNotFound(_)
                | StrataError::FieldNotFound { .. }
                | StrataError::DeclarationsNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            StrataError::Io(_) | StrataError::FileRead { .. } | StrataError::FileWrite { .. }
        )
    }
}

/// Result type alias using StrataError
pub type StrataResult<T> = Result<T, StrataError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> StrataResult<T>;
}

impl<T, E: Into<StrataError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> StrataResult<T> {
        self.map_err(|e| {
            let err: StrataError = e.into();
            StrataError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// FailureSignal
// ============================================================================

/// Stable runtime failure signals carried by generated operation specs.
///
/// These identify the distinct error outcomes a generated CRUD operation
/// can produce at request time. They are artifact data, not engine errors:
/// the engine never raises them itself, it only declares which operations
/// can surface which.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSignal {
    /// The addressed row does not exist (or is soft-deleted)
    NotFound,
    /// A unique or foreign-key constraint was violated
    Conflict,
    /// The row was matched but the update modified nothing
    PreconditionFailed,
    /// Unexpected storage fault, collapsed to one generic signal
    Internal,
}

impl FailureSignal {
    /// Stable wire identifier for the signal
    pub fn code(&self) -> &'static str {
        match self {
            FailureSignal::NotFound => "not_found",
            FailureSignal::Conflict => "conflict",
            FailureSignal::PreconditionFailed => "precondition_failed",
            FailureSignal::Internal => "internal",
        }
    }

    /// Suggested HTTP status for the dispatch layer
    pub fn http_status(&self) -> u16 {
        match self {
            FailureSignal::NotFound => 404,
            FailureSignal::Conflict => 409,
            FailureSignal::PreconditionFailed => 412,
            FailureSignal::Internal => 500,
        }
    }
}

impl std::fmt::Display for FailureSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Tests
// ============================================================================
