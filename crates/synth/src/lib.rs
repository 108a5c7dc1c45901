//! Strata synthesis engine
//!
//! Turns a validated content-type registry into a set of deployable
//! artifacts: a relational schema (base and join tables), validation
//! rulesets, and CRUD operation specifications.
//!
//! The pipeline is `resolve_relations` once over the whole registry,
//! followed by per-type fan-out of the pure synthesis functions. The
//! [`Synthesizer`] drives the whole run from a [`SynthConfig`].

pub mod api;
pub mod resolver;
pub mod schema;
pub mod synthesizer;
pub mod validation;

pub use api::{
    synthesize_api_surface, AuthTier, DeleteMode, InputShape, OperationKind, OperationSpec,
    OutputShape, Pagination, OPERATION_COUNT,
};
pub use resolver::{resolve_relations, JoinTableIdentity, RelationEdge, RelationGraph};
pub use schema::{
    synthesize_schema, Column, ForeignKey, RelationMeta, SchemaArtifact, Table, TableKind,
};
pub use synthesizer::{SynthConfig, SynthesisOutput, Synthesizer, TypeArtifacts};
pub use validation::{synthesize_validation, Ruleset, RulesetBundle};
