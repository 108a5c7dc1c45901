//! Validation synthesis
//!
//! Derives the three per-type rulesets (`create`, `update`, `output`) from a
//! content-type descriptor. Ruleset field names use the API-facing camelCase
//! convention; owning relation fields surface as `{field}Id`, the same field
//! the schema synthesizer turns into the `{field}_id` column.
//!
//! The laws the rulesets obey:
//! - `create` excludes fields marked non-creatable; a rule is required only
//!   when the field is required and carries no default.
//! - `update` excludes non-updatable fields and wraps every rule as optional
//!   (partial-update semantics).
//! - `output` includes every visible field plus the identifier and, when
//!   enabled, `createdAt`/`updatedAt`/`deletedAt`.

use heck::ToLowerCamelCase;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strata_core::{LocaleConfig, Rule, RuleEntry, StrataError, StrataResult};
use strata_ir::{ContentType, FieldDescriptor, FieldKind, NumberShape, TextVariant, TypeRegistry};

// ============================================================================
// Ruleset
// ============================================================================

/// One named ruleset: an ordered list of field rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Ruleset name (`create`, `update`, or `output`)
    pub name: String,

    /// Entries in field-declaration order
    pub entries: Vec<RuleEntry>,
}

impl Ruleset {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Look up an entry by field name
    pub fn entry(&self, name: &str) -> Option<&RuleEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Field names in order
    pub fn field_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Whether an entry exists and is required
    pub fn requires(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| e.required)
    }
}

/// The three rulesets synthesized for one content type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetBundle {
    pub create: Ruleset,
    pub update: Ruleset,
    pub output: Ruleset,
}

// ============================================================================
// Synthesis
// ============================================================================

/// Derive the validation rulesets for one content type.
///
/// Pure function of the descriptor set and locale configuration. The full
/// registry is needed to type relation fields after their target's
/// identifier strategy; an unresolvable target degrades that one field to
/// an unconstrained rule with a warning rather than failing the batch.
pub fn synthesize_validation(
    ct: &ContentType,
    registry: &TypeRegistry,
    locales: &LocaleConfig,
) -> StrataResult<RulesetBundle> {
    let mut create = Ruleset::new("create");
    let mut update = Ruleset::new("update");
    let mut output = Ruleset::new("output");

    // Distinct api ids can still collide after case conversion and the
    // relation Id suffix (`author` + `author_id` both become `authorId`)
    let mut seen = HashSet::new();

    for field in &ct.fields {
        let name = ruleset_field_name(field);
        if !seen.insert(name.clone()) {
            return Err(StrataError::FieldValidation {
                content_type: ct.api_id.clone(),
                field: field.api_id.clone(),
                message: format!("api name '{}' is already taken in this type", name),
            });
        }
        let rule = derive_rule(ct, field, registry, locales);

        if field.creatable && !field.is_identifier() {
            let required = field.required && field.default_value.is_none();
            create.entries.push(if required {
                RuleEntry::required(name.clone(), rule.clone())
            } else {
                RuleEntry::optional(name.clone(), rule.clone().optional())
            });
        }

        // Partial-update semantics: presence is never mandated
        if field.updatable && !field.is_identifier() {
            update
                .entries
                .push(RuleEntry::optional(name.clone(), rule.clone().optional()));
        }

        if !field.hidden {
            output.entries.push(if field.required || field.is_identifier() {
                RuleEntry::required(name, rule)
            } else {
                RuleEntry::optional(name, rule.optional())
            });
        }
    }

    if ct.timestamps {
        output
            .entries
            .push(RuleEntry::required("createdAt", Rule::DateTime));
        output
            .entries
            .push(RuleEntry::required("updatedAt", Rule::DateTime));
    }
    if ct.soft_delete {
        output
            .entries
            .push(RuleEntry::optional("deletedAt", Rule::DateTime.optional()));
    }

    Ok(RulesetBundle {
        create,
        update,
        output,
    })
}

/// API-facing field name: camelCase api id, with an `Id` suffix for
/// relation fields that own a foreign-key column
pub fn ruleset_field_name(field: &FieldDescriptor) -> String {
    match field.relation_options() {
        Some(opts) if opts.cardinality.owns_column() => {
            format!("{}Id", field.api_id.to_lower_camel_case())
        }
        _ => field.api_id.to_lower_camel_case(),
    }
}

/// Derive the base rule for one field (before optionality wrapping)
fn derive_rule(
    ct: &ContentType,
    field: &FieldDescriptor,
    registry: &TypeRegistry,
    locales: &LocaleConfig,
) -> Rule {
    let scalar = match &field.kind {
        FieldKind::Identifier { strategy } => strategy.rule(),
        FieldKind::Text {
            variant,
            min_length,
            max_length,
            pattern,
        } => match variant {
            TextVariant::Slug => Rule::Slug,
            TextVariant::Plain => Rule::String {
                min_length: *min_length,
                max_length: *max_length,
                pattern: pattern.clone(),
            },
        },
        FieldKind::RichText => Rule::RichText,
        FieldKind::Number { shape, min, max } => match shape {
            NumberShape::Integer => Rule::Integer {
                min: min.map(|v| v as i64),
                max: max.map(|v| v as i64),
            },
            NumberShape::Float => Rule::Float {
                min: *min,
                max: *max,
            },
        },
        FieldKind::Boolean => Rule::Boolean,
        FieldKind::Date { with_time: false } => Rule::Date,
        FieldKind::Date { with_time: true } => Rule::DateTime,
        FieldKind::Relation(opts) => {
            let id_rule = relation_id_rule(ct, field, registry, &opts.related_type);
            if opts.cardinality.is_plural() {
                return if field.localized {
                    localized_rule(Rule::Array(Box::new(id_rule)), field, locales)
                } else {
                    Rule::Array(Box::new(id_rule))
                };
            }
            id_rule
        }
        FieldKind::Media => Rule::Media,
        FieldKind::Json => Rule::Json,
    };

    if field.localized {
        localized_rule(scalar, field, locales)
    } else {
        scalar
    }
}

/// Rule matching identifiers of a relation target.
///
/// Degraded path: when the target cannot be resolved the field accepts
/// anything, and the gap is surfaced loudly instead of halting the whole
/// batch for one bad reference.
fn relation_id_rule(
    ct: &ContentType,
    field: &FieldDescriptor,
    registry: &TypeRegistry,
    target: &str,
) -> Rule {
    match registry.get(target).and_then(|t| t.id_strategy()) {
        Some(strategy) => strategy.rule(),
        None => {
            tracing::warn!(
                content_type = %ct.api_id,
                field = %field.api_id,
                target = %target,
                "relation target identifier unresolvable, rule degraded to accept-any"
            );
            Rule::Any
        }
    }
}

/// Wrap a scalar rule as an object keyed by locale code. Only the default
/// locale inherits the field's required-ness.
fn localized_rule(scalar: Rule, field: &FieldDescriptor, locales: &LocaleConfig) -> Rule {
    let entries = locales
        .locales
        .iter()
        .map(|locale| {
            if *locale == locales.default_locale && field.required {
                RuleEntry::required(locale.clone(), scalar.clone())
            } else {
                RuleEntry::optional(locale.clone(), scalar.clone().optional())
            }
        })
        .collect();
    Rule::Object(entries)
}

// ============================================================================
// Tests
// ============================================================================
