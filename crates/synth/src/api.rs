//! API surface synthesis
//!
//! Derives the five CRUD operation specifications for a content type. An
//! operation spec is a description, not an implementation: it names the
//! authorization tier, the input and output shapes, the storage table it
//! runs against, and the stable failure signals a caller can receive. A
//! serving layer executes the specs against a storage adapter at request
//! time.

use serde::{Deserialize, Serialize};
use strata_core::FailureSignal;
use strata_ir::ContentType;

use crate::schema::Table;
use crate::validation::{Ruleset, RulesetBundle};

/// Number of operations every content type exposes
pub const OPERATION_COUNT: usize = 5;

// ============================================================================
// Building blocks
// ============================================================================

/// Authorization tier required to invoke an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthTier {
    /// No credential required
    Public,
    /// Any authenticated caller
    Authenticated,
}

/// Kind of a generated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    List,
    GetOne,
    Create,
    Update,
    Delete,
}

impl OperationKind {
    /// Short operation name, used as the suffix of the full operation id
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::List => "list",
            OperationKind::GetOne => "getOne",
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Delete => "delete",
        }
    }
}

/// Pagination bounds for the list operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub min_limit: u32,
    pub max_limit: u32,
    pub default_limit: u32,
    pub default_offset: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            min_limit: 1,
            max_limit: 100,
            default_limit: 20,
            default_offset: 0,
        }
    }
}

impl Pagination {
    /// Clamp a requested limit into the allowed range, defaulting when absent
    pub fn effective_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(self.min_limit, self.max_limit)
    }
}

/// How the delete operation removes a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteMode {
    /// Physically remove the row
    Hard,
    /// Set `deleted_at` and keep the row, hidden from reads
    Soft,
}

/// Input shape of an operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum InputShape {
    /// `{limit, offset}` within the pagination bounds
    Page(Pagination),
    /// `{id}`
    Identifier,
    /// A document matching the given ruleset
    Document(Ruleset),
    /// `{id, data}` where data matches the given (all-optional) ruleset
    IdentifierWithPatch(Ruleset),
}

/// Output shape of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputShape {
    /// Zero or more rows matching the output ruleset
    RowPage,
    /// One row, or empty when nothing matched
    MaybeRow,
    /// Exactly one row
    Row,
    /// The affected row's identifier
    Identifier,
}

// ============================================================================
// OperationSpec
// ============================================================================

/// One generated CRUD operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Stable operation id: `{type_api_id}.{operation}`
    pub id: String,

    pub kind: OperationKind,
    pub auth: AuthTier,

    /// Table the operation runs against
    pub table: String,

    pub input: InputShape,
    pub output: OutputShape,

    /// Reads and row-matching skip soft-deleted rows
    pub excludes_soft_deleted: bool,

    /// Writes set `updated_at` when timestamps are enabled
    pub touches_updated_at: bool,

    /// Delete semantics; only meaningful on the delete operation
    pub delete_mode: Option<DeleteMode>,

    /// Stable failure signals this operation can return, in addition to a
    /// successful result
    pub failure_modes: Vec<FailureSignal>,
}

// ============================================================================
// Synthesis
// ============================================================================

/// Derive the five operation specs for one content type.
///
/// Pure function; the output order is fixed (list, getOne, create, update,
/// delete).
pub fn synthesize_api_surface(
    ct: &ContentType,
    table: &Table,
    rulesets: &RulesetBundle,
) -> [OperationSpec; OPERATION_COUNT] {
    let soft = ct.soft_delete;
    let op_id = |kind: OperationKind| format!("{}.{}", ct.api_id, kind.name());

    let list = OperationSpec {
        id: op_id(OperationKind::List),
        kind: OperationKind::List,
        auth: AuthTier::Public,
        table: table.name.clone(),
        input: InputShape::Page(Pagination::default()),
        output: OutputShape::RowPage,
        excludes_soft_deleted: soft,
        touches_updated_at: false,
        delete_mode: None,
        failure_modes: vec![FailureSignal::Internal],
    };

    let get_one = OperationSpec {
        id: op_id(OperationKind::GetOne),
        kind: OperationKind::GetOne,
        auth: AuthTier::Public,
        table: table.name.clone(),
        input: InputShape::Identifier,
        output: OutputShape::MaybeRow,
        excludes_soft_deleted: soft,
        touches_updated_at: false,
        delete_mode: None,
        // A missing row is an empty result, never a failure signal
        failure_modes: vec![FailureSignal::Internal],
    };

    let create = OperationSpec {
        id: op_id(OperationKind::Create),
        kind: OperationKind::Create,
        auth: AuthTier::Authenticated,
        table: table.name.clone(),
        input: InputShape::Document(rulesets.create.clone()),
        output: OutputShape::Row,
        excludes_soft_deleted: false,
        touches_updated_at: false,
        delete_mode: None,
        failure_modes: vec![FailureSignal::Conflict, FailureSignal::Internal],
    };

    let update = OperationSpec {
        id: op_id(OperationKind::Update),
        kind: OperationKind::Update,
        auth: AuthTier::Authenticated,
        table: table.name.clone(),
        input: InputShape::IdentifierWithPatch(rulesets.update.clone()),
        output: OutputShape::Row,
        excludes_soft_deleted: soft,
        touches_updated_at: ct.timestamps,
        delete_mode: None,
        failure_modes: vec![
            FailureSignal::NotFound,
            FailureSignal::PreconditionFailed,
            FailureSignal::Conflict,
            FailureSignal::Internal,
        ],
    };

    let delete = OperationSpec {
        id: op_id(OperationKind::Delete),
        kind: OperationKind::Delete,
        auth: AuthTier::Authenticated,
        table: table.name.clone(),
        input: InputShape::Identifier,
        output: OutputShape::Identifier,
        excludes_soft_deleted: soft,
        touches_updated_at: soft && ct.timestamps,
        delete_mode: Some(if soft { DeleteMode::Soft } else { DeleteMode::Hard }),
        // Hard delete can hit FK references elsewhere; a soft delete cannot
        failure_modes: if soft {
            vec![FailureSignal::NotFound, FailureSignal::Internal]
        } else {
            vec![
                FailureSignal::NotFound,
                FailureSignal::Conflict,
                FailureSignal::Internal,
            ]
        },
    };

    [list, get_one, create, update, delete]
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::resolve_relations;
    use crate::schema::synthesize_schema;
    use crate::validation::synthesize_validation;
    use strata_core::LocaleConfig;
    use strata_ir::{ContentType, FieldDescriptor, TypeRegistry};

    fn surface(ct: ContentType) -> [OperationSpec; OPERATION_COUNT] {
        let registry = TypeRegistry::new("t").with(ct);
        let ct = &registry.content_types[0];
        let graph = resolve_relations(&registry).unwrap();
        let artifact = synthesize_schema(ct, &registry, &graph).unwrap();
        let rulesets =
            synthesize_validation(ct, &registry, &LocaleConfig::default()).unwrap();
        synthesize_api_surface(ct, &artifact.base_table, &rulesets)
    }

    #[test]
    fn test_five_operations_in_fixed_order() {
        let ops = surface(ContentType::new("post"));
        let kinds: Vec<OperationKind> = ops.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::List,
                OperationKind::GetOne,
                OperationKind::Create,
                OperationKind::Update,
                OperationKind::Delete,
            ]
        );
        assert_eq!(ops[0].id, "post.list");
        assert_eq!(ops[1].id, "post.getOne");
        assert!(ops.iter().all(|o| o.table == "post"));
    }

    #[test]
    fn test_auth_tiers() {
        let ops = surface(ContentType::new("post"));
        assert_eq!(ops[0].auth, AuthTier::Public);
        assert_eq!(ops[1].auth, AuthTier::Public);
        assert_eq!(ops[2].auth, AuthTier::Authenticated);
        assert_eq!(ops[3].auth, AuthTier::Authenticated);
        assert_eq!(ops[4].auth, AuthTier::Authenticated);
    }

    #[test]
    fn test_pagination_bounds() {
        let p = Pagination::default();
        assert_eq!(p.effective_limit(None), 20);
        assert_eq!(p.effective_limit(Some(0)), 1);
        assert_eq!(p.effective_limit(Some(50)), 50);
        assert_eq!(p.effective_limit(Some(500)), 100);
    }

    #[test]
    fn test_get_one_missing_row_is_not_a_failure() {
        let ops = surface(ContentType::new("post"));
        let get_one = &ops[1];
        assert_eq!(get_one.output, OutputShape::MaybeRow);
        assert!(!get_one.failure_modes.contains(&FailureSignal::NotFound));
    }

    #[test]
    fn test_create_input_is_create_ruleset() {
        let ops = surface(
            ContentType::new("post").with_field(FieldDescriptor::text("title").required()),
        );
        match &ops[2].input {
            InputShape::Document(ruleset) => {
                assert_eq!(ruleset.name, "create");
                assert!(ruleset.requires("title"));
            }
            other => panic!("expected document input, got {:?}", other),
        }
        assert!(ops[2].failure_modes.contains(&FailureSignal::Conflict));
    }

    #[test]
    fn test_update_failure_modes() {
        let ops = surface(ContentType::new("post"));
        let update = &ops[3];
        assert_eq!(
            update.failure_modes,
            vec![
                FailureSignal::NotFound,
                FailureSignal::PreconditionFailed,
                FailureSignal::Conflict,
                FailureSignal::Internal,
            ]
        );
        assert!(update.touches_updated_at);
    }

    #[test]
    fn test_hard_delete_semantics() {
        let ops = surface(ContentType::new("post"));
        let delete = &ops[4];
        assert_eq!(delete.delete_mode, Some(DeleteMode::Hard));
        assert!(delete.failure_modes.contains(&FailureSignal::Conflict));
        assert!(!delete.touches_updated_at);
    }

    #[test]
    fn test_soft_delete_semantics() {
        let ops = surface(ContentType::new("post").soft_delete());
        let delete = &ops[4];
        assert_eq!(delete.delete_mode, Some(DeleteMode::Soft));
        assert!(delete.touches_updated_at);
        // A second delete on the same id sees the row filtered out and
        // reports not-found, never conflict
        assert!(delete.excludes_soft_deleted);
        assert!(delete.failure_modes.contains(&FailureSignal::NotFound));
        assert!(!delete.failure_modes.contains(&FailureSignal::Conflict));

        // Reads share the same filter
        assert!(ops[0].excludes_soft_deleted);
        assert!(ops[1].excludes_soft_deleted);
    }

    #[test]
    fn test_no_soft_delete_filter_without_flag() {
        let ops = surface(ContentType::new("post"));
        assert!(ops.iter().all(|o| !o.excludes_soft_deleted));
    }
}
