//! # Strata Core
//!
//! Core types, traits, and error handling for the Strata scaffolding engine.
//!
//! This crate provides the foundational building blocks used throughout the
//! Strata workspace, including:
//!
//! - **Types**: identifier strategies, column types, cardinalities,
//!   referential actions, the validation rule vocabulary, locale config
//! - **Traits**: common behaviors like `Validatable` and `Persistable`
//! - **Errors**: unified error handling with `StrataError` and
//!   `StrataResult`, plus the stable `FailureSignal` vocabulary carried by
//!   generated operation specs
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{FailureSignal, ResultExt, StrataError, StrataResult};
pub use traits::{Identifiable, Named, Persistable, Validatable};
pub use types::{
    Cardinality, ColumnType, DatabaseType, IdStrategy, LocaleConfig, ReferentialAction, Rule,
    RuleEntry,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
