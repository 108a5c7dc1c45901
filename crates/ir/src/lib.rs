//! # Strata IR
//!
//! Declarative descriptors for the Strata scaffolding engine.
//!
//! Content types and their fields are declared as plain data. The full
//! [`TypeRegistry`] of descriptors is then handed to the synthesizers in
//! `strata_synth`, which derive the storage schema, validation rulesets,
//! and API surface from it.
//!
//! ## Structure
//!
//! - [`field`] — `FieldDescriptor`, `FieldKind`, relation options, defaults
//! - [`content_type`] — `ContentType` descriptors
//! - [`registry`] — the `TypeRegistry` declaration set

pub mod content_type;
pub mod field;
pub mod registry;

// Re-export commonly used items at crate root
pub use content_type::ContentType;
pub use field::{
    DefaultValue, FieldDescriptor, FieldKind, NumberShape, RelationOptions, TextVariant,
    is_valid_api_id,
};
pub use registry::TypeRegistry;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
