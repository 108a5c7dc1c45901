//! Relation resolution
//!
//! Given the full registry of content types, this module computes, for
//! every relation field, its resolved [`RelationEdge`]: the cardinality,
//! the storage shape (owning foreign-key column vs. none), and, for
//! many-to-many relations, the canonical join-table identity.
//!
//! Two derivations make this more than a field walk:
//!
//! - **Join-table deduplication.** A many-to-many relation between `a` and
//!   `b` yields exactly one join table whether one side or both sides
//!   declare it. The identity is the two type api ids sorted
//!   lexicographically and joined with `_to_`, so the result is independent
//!   of declaration order and declaration site.
//! - **Inverse synthesis.** Every many-to-one declaration `a.f -> b` gives
//!   `b` a collection-valued one-to-many edge back at `a` that `b` never
//!   declared, named `{a}s` (or the declaring field's `inverse_name`
//!   override).
//!
//! Resolution must see the complete registry: partial views produce
//! incomplete inverse-edge sets.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strata_core::{Cardinality, StrataError, StrataResult};
use strata_ir::{ContentType, FieldDescriptor, TypeRegistry};

/// Separator used to build join-table identifiers from a sorted type pair
pub const JOIN_TABLE_SEPARATOR: &str = "_to_";

// ============================================================================
// RelationEdge
// ============================================================================

/// A resolved (not necessarily declared) link between two content types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationEdge {
    /// Api id of the content type this edge starts from
    pub from_type: String,

    /// Api id of the content type this edge points at
    pub to_type: String,

    /// Relation name as exposed on `from_type` (the declaring field's api
    /// id, or the synthesized inverse name)
    pub name: String,

    /// Cardinality as seen from `from_type`
    pub cardinality: Cardinality,

    /// The field on `from_type` that declared this edge; synthesized
    /// inverse edges have none
    pub owning_field: Option<String>,

    /// The field whose derived column carries the foreign key: on
    /// `from_type` for one-to-one/many-to-one edges, on `to_type` for
    /// synthesized inverses. Absent for many-to-many and for declared
    /// one-to-many fields with no reciprocal declaration.
    pub fk_field: Option<String>,

    /// Join table id; present only for many-to-many edges
    pub join_table: Option<String>,
}

impl RelationEdge {
    /// Whether this edge was synthesized rather than declared
    pub fn is_synthesized(&self) -> bool {
        self.owning_field.is_none()
    }

    /// Whether `from_type`'s base table carries the foreign-key column
    pub fn owns_column(&self) -> bool {
        self.owning_field.is_some() && self.cardinality.owns_column()
    }
}

// ============================================================================
// JoinTableIdentity
// ============================================================================

/// Canonical identity of a many-to-many join table
///
/// `left` and `right` are the two type api ids in lexicographic order; the
/// table id is fully determined by them, independent of which side declared
/// the relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTableIdentity {
    /// Join table id (`{left}_to_{right}`)
    pub id: String,

    /// Lexicographically smaller type api id
    pub left: String,

    /// Lexicographically larger type api id
    pub right: String,
}

impl JoinTableIdentity {
    /// Compute the identity for an unordered pair of type api ids
    pub fn for_pair(a: &str, b: &str) -> Self {
        let (left, right) = if a <= b { (a, b) } else { (b, a) };
        Self {
            id: format!("{}{}{}", left, JOIN_TABLE_SEPARATOR, right),
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}

// ============================================================================
// RelationGraph
// ============================================================================

/// The resolved relation graph for a complete registry
///
/// Edges are grouped by originating type and kept in deterministic order:
/// declared edges in field-declaration order, synthesized inverses after
/// them in the order their declaring sides appear in the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationGraph {
    /// Originating type api id -> edges out of that type
    edges: BTreeMap<String, Vec<RelationEdge>>,

    /// Join-table identities, keyed (and therefore ordered) by id
    join_tables: BTreeMap<String, JoinTableIdentity>,
}

impl RelationGraph {
    /// All edges originating at the given type, declared first
    pub fn edges_for(&self, api_id: &str) -> &[RelationEdge] {
        self.edges.get(api_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Look up one edge by originating type and relation name
    pub fn edge(&self, api_id: &str, name: &str) -> Option<&RelationEdge> {
        self.edges_for(api_id).iter().find(|e| e.name == name)
    }

    /// Only the synthesized inverse edges for the given type
    pub fn inverse_edges_for(&self, api_id: &str) -> Vec<&RelationEdge> {
        self.edges_for(api_id)
            .iter()
            .filter(|e| e.is_synthesized())
            .collect()
    }

    /// All join-table identities, ordered by id
    pub fn join_tables(&self) -> impl Iterator<Item = &JoinTableIdentity> {
        self.join_tables.values()
    }

    /// Join-table identities the given type participates in, ordered by id
    pub fn join_tables_for(&self, api_id: &str) -> Vec<&JoinTableIdentity> {
        self.join_tables
            .values()
            .filter(|jt| jt.left == api_id || jt.right == api_id)
            .collect()
    }

    /// Total number of edges in the graph
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    fn push_edge(&mut self, edge: RelationEdge) {
        self.edges.entry(edge.from_type.clone()).or_default().push(edge);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the relation graph for a complete registry.
///
/// Fails fast on dangling `related_type` references and on join-table id
/// collisions between distinct type pairs. Pure and deterministic: the same
/// registry always yields the same graph.
pub fn resolve_relations(registry: &TypeRegistry) -> StrataResult<RelationGraph> {
    let mut graph = RelationGraph::default();

    // Pass 1: declared edges and join tables
    for ct in registry.iter() {
        for field in ct.relation_fields() {
            let edge = resolve_declared_edge(registry, &mut graph, ct, field)?;
            graph.push_edge(edge);
        }
    }

    // Pass 2: synthesized inverses for every many-to-one declaration
    for ct in registry.iter() {
        for field in ct.relation_fields() {
            let opts = field
                .relation_options()
                .ok_or_else(|| StrataError::internal("relation field without options"))?;
            if opts.cardinality != Cardinality::ManyToOne {
                continue;
            }

            let inverse_name = opts
                .inverse_name
                .clone()
                .unwrap_or_else(|| format!("{}s", ct.api_id));

            // The related type may already declare a field with that name,
            // or an earlier declaration may already have synthesized it.
            let target = &opts.related_type;
            if registry
                .get(target)
                .is_some_and(|t| t.field(&inverse_name).is_some())
            {
                tracing::debug!(
                    from = %ct.api_id,
                    field = %field.api_id,
                    inverse = %inverse_name,
                    "skipping inverse edge: target declares a field with that name"
                );
                continue;
            }
            if graph.edge(target, &inverse_name).is_some() {
                tracing::warn!(
                    from = %ct.api_id,
                    field = %field.api_id,
                    inverse = %inverse_name,
                    "skipping inverse edge: name already taken on target; \
                     set inverse_name on the declaring field to disambiguate"
                );
                continue;
            }

            graph.push_edge(RelationEdge {
                from_type: target.clone(),
                to_type: ct.api_id.clone(),
                name: inverse_name,
                cardinality: Cardinality::OneToMany,
                owning_field: None,
                fk_field: Some(field.api_id.clone()),
                join_table: None,
            });
        }
    }

    Ok(graph)
}

fn resolve_declared_edge(
    registry: &TypeRegistry,
    graph: &mut RelationGraph,
    ct: &ContentType,
    field: &FieldDescriptor,
) -> StrataResult<RelationEdge> {
    let opts = field
        .relation_options()
        .ok_or_else(|| StrataError::internal("relation field without options"))?;

    if !registry.contains(&opts.related_type) {
        return Err(StrataError::DanglingRelation {
            content_type: ct.api_id.clone(),
            field: field.api_id.clone(),
            target: opts.related_type.clone(),
        });
    }

    let join_table = match opts.cardinality {
        Cardinality::ManyToMany => {
            let identity = JoinTableIdentity::for_pair(&ct.api_id, &opts.related_type);
            Some(register_join_table(graph, identity)?)
        }
        _ => None,
    };

    let fk_field = match opts.cardinality {
        // The declaring side owns the column
        Cardinality::OneToOne | Cardinality::ManyToOne => Some(field.api_id.clone()),
        // A declared collection: the column, if any, lives on the target
        // side as a reciprocal many-to-one declaration
        Cardinality::OneToMany => registry
            .get(&opts.related_type)
            .and_then(|target| {
                target.relation_fields().into_iter().find(|f| {
                    f.relation_options().is_some_and(|o| {
                        o.related_type == ct.api_id && o.cardinality == Cardinality::ManyToOne
                    })
                })
            })
            .map(|f| f.api_id.clone()),
        Cardinality::ManyToMany => None,
    };

    Ok(RelationEdge {
        from_type: ct.api_id.clone(),
        to_type: opts.related_type.clone(),
        name: field.api_id.clone(),
        cardinality: opts.cardinality,
        owning_field: Some(field.api_id.clone()),
        fk_field,
        join_table,
    })
}

/// Register a join-table identity, reusing it when the same pair was seen
/// before and rejecting distinct pairs that map to the same id.
fn register_join_table(
    graph: &mut RelationGraph,
    identity: JoinTableIdentity,
) -> StrataResult<String> {
    match graph.join_tables.get(&identity.id) {
        Some(existing) if *existing == identity => Ok(identity.id),
        Some(existing) => Err(StrataError::JoinTableCollision {
            join_table: identity.id.clone(),
            first: format!("({}, {})", existing.left, existing.right),
            second: format!("({}, {})", identity.left, identity.right),
        }),
        None => {
            let id = identity.id.clone();
            graph.join_tables.insert(id.clone(), identity);
            Ok(id)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use strata_ir::FieldDescriptor;

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
                    .with_field(
                        FieldDescriptor::relation("author", "user", Cardinality::ManyToOne)
                            .required(),
                    )
                    .with_field(FieldDescriptor::relation(
                        "tags",
                        "tag",
                        Cardinality::ManyToMany,
                    ))
                    .with_display_field("title"),
            )
            .with(ContentType::new("tag").with_field(FieldDescriptor::slug("name")))
    }

    #[test]
    fn test_owned_edge_resolution() {
        let graph = resolve_relations(&blog_registry()).unwrap();

        let edge = graph.edge("post", "author").unwrap();
        assert_eq!(edge.to_type, "user");
        assert_eq!(edge.cardinality, Cardinality::ManyToOne);
        assert_eq!(edge.owning_field.as_deref(), Some("author"));
        assert_eq!(edge.fk_field.as_deref(), Some("author"));
        assert!(edge.owns_column());
        assert!(edge.join_table.is_none());
    }

    #[test]
    fn test_inverse_edge_synthesis() {
        let graph = resolve_relations(&blog_registry()).unwrap();

        // user never mentions posts, yet gets a one-to-many edge
        let edge = graph.edge("user", "posts").unwrap();
        assert_eq!(edge.to_type, "post");
        assert_eq!(edge.cardinality, Cardinality::OneToMany);
        assert!(edge.is_synthesized());
        assert!(edge.owning_field.is_none());
        assert_eq!(edge.fk_field.as_deref(), Some("author"));

        assert_eq!(graph.inverse_edges_for("user").len(), 1);
    }

    #[test]
    fn test_inverse_name_override() {
        let registry = TypeRegistry::new("tree")
            .with(
                ContentType::new("category")
                    .with_field(FieldDescriptor::slug("name"))
                    .with_field(
                        FieldDescriptor::relation("parent", "category", Cardinality::ManyToOne)
                            .with_inverse_name("children"),
                    ),
            );

        let graph = resolve_relations(&registry).unwrap();
        // The naive suffix would have produced "categorys"
        assert!(graph.edge("category", "children").is_some());
        assert!(graph.edge("category", "categorys").is_none());
    }

    #[test]
    fn test_inverse_skipped_when_target_declares_field() {
        let registry = TypeRegistry::new("blog")
            .with(
                ContentType::new("user")
                    .with_field(FieldDescriptor::relation(
                        "posts",
                        "post",
                        Cardinality::OneToMany,
                    )),
            )
            .with(
                ContentType::new("post").with_field(FieldDescriptor::relation(
                    "author",
                    "user",
                    Cardinality::ManyToOne,
                )),
            );

        let graph = resolve_relations(&registry).unwrap();
        // The declared field wins; exactly one "posts" edge on user
        let edges: Vec<_> = graph
            .edges_for("user")
            .iter()
            .filter(|e| e.name == "posts")
            .collect();
        assert_eq!(edges.len(), 1);
        assert!(!edges[0].is_synthesized());
        // The declared collection resolves its reciprocal FK field
        assert_eq!(edges[0].fk_field.as_deref(), Some("author"));
    }

    #[test]
    fn test_join_table_identity_is_sorted() {
        let a = JoinTableIdentity::for_pair("post", "tag");
        let b = JoinTableIdentity::for_pair("tag", "post");
        assert_eq!(a, b);
        assert_eq!(a.id, "post_to_tag");
        assert_eq!(a.left, "post");
        assert_eq!(a.right, "tag");
    }

    #[test]
    fn test_join_table_dedup_across_both_declarations() {
        // Both sides declare the m2m with different field names
        let registry = TypeRegistry::new("blog")
            .with(ContentType::new("post").with_field(FieldDescriptor::relation(
                "tags",
                "tag",
                Cardinality::ManyToMany,
            )))
            .with(ContentType::new("tag").with_field(FieldDescriptor::relation(
                "tagged_posts",
                "post",
                Cardinality::ManyToMany,
            )));

        let graph = resolve_relations(&registry).unwrap();
        let tables: Vec<_> = graph.join_tables().collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, "post_to_tag");

        // Both edges reference the same table
        assert_eq!(
            graph.edge("post", "tags").unwrap().join_table.as_deref(),
            Some("post_to_tag")
        );
        assert_eq!(
            graph
                .edge("tag", "tagged_posts")
                .unwrap()
                .join_table
                .as_deref(),
            Some("post_to_tag")
        );
    }

    #[test]
    fn test_join_table_single_declaration() {
        let graph = resolve_relations(&blog_registry()).unwrap();
        let tables: Vec<_> = graph.join_tables().collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, "post_to_tag");
        assert_eq!(graph.join_tables_for("tag")[0].id, "post_to_tag");
    }

    #[test]
    fn test_dangling_relation_fails() {
        let registry = TypeRegistry::new("blog").with(
            ContentType::new("post").with_field(FieldDescriptor::relation(
                "author",
                "writer",
                Cardinality::ManyToOne,
            )),
        );

        let err = resolve_relations(&registry).unwrap_err();
        match err {
            StrataError::DanglingRelation {
                content_type,
                field,
                target,
            } => {
                assert_eq!(content_type, "post");
                assert_eq!(field, "author");
                assert_eq!(target, "writer");
            }
            other => panic!("expected dangling relation error, got {}", other),
        }
    }

    #[test]
    fn test_self_referential_many_to_many() {
        let registry = TypeRegistry::new("social").with(
            ContentType::new("user").with_field(FieldDescriptor::relation(
                "follows",
                "user",
                Cardinality::ManyToMany,
            )),
        );

        let graph = resolve_relations(&registry).unwrap();
        let tables: Vec<_> = graph.join_tables().collect();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, "user_to_user");
    }

    #[test]
    fn test_determinism() {
        let registry = blog_registry();
        let a = resolve_relations(&registry).unwrap();
        let b = resolve_relations(&registry).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
