//! Relationship inference
//!
//! Second construction pass. Runs once the owner's tentative descriptor is
//! cached, so the owner's primary keys are known and types referring back to
//! the owner see it instead of recursing.
//!
//! Each relationship candidate (a field holding a model or a slice of
//! models) is resolved to one of:
//!
//! - `Vec<T>` tagged `MANY2MANY:<table>`: many-to-many through `<table>`
//! - other `Vec<T>`: has-many, keys on `T` pointing at the owner
//! - `T`: has-one (keys on `T`), else belongs-to (keys on the owner)
//!
//! A candidate whose keys resolve on neither side becomes a plain column.

use crate::descriptor::{FieldDescriptor, JoinColumn, JoinTableSpec, ModelDescriptor, RelationshipDescriptor};
use crate::naming::{join_identifier, strip_identifier_prefix};
use crate::registry::BuildContext;
use crate::tags::{ASSOCIATIONFOREIGNKEY, FOREIGNKEY, MANY2MANY, POLYMORPHIC, TagSettings};
use ormeta_core::{ConfigIssue, RelationKind};
use std::sync::Arc;

/// Message recorded when the two key lists of a field differ in length
pub const MISMATCHED_KEYS: &str = "invalid foreign keys, should have same length";

type KeyPairs<'a> = Vec<(&'a FieldDescriptor, &'a FieldDescriptor)>;

/// Resolve every relationship candidate of `owner`
///
/// Returns the configuration problems found; the offending fields are left
/// as plain columns. A candidate whose target is still in its first pass
/// is deferred on `ctx` and resolved once the target is cached.
pub(crate) fn resolve_relationships(
    ctx: &mut BuildContext<'_>,
    owner: &Arc<ModelDescriptor>,
) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    for (index, field) in owner.fields().iter().enumerate() {
        if field.is_ignored() || field.is_normal() || field.relationship().is_some() {
            continue;
        }

        let field_type = field.field_type();
        let Some(target) = field_type.slice_model().or(field_type.model_ref()).copied() else {
            field.mark_normal();
            continue;
        };

        match ctx.resolve(target) {
            Some(related) => issues.extend(resolve_field(owner, field, &related)),
            None => {
                tracing::trace!(
                    model = owner.type_name(),
                    field = field.name(),
                    target = target.rust_name(),
                    "Target still in its first pass, deferring"
                );
                ctx.defer(target, Arc::clone(owner), index);
            }
        }
    }

    issues
}

/// Resolve one candidate of `owner` against the descriptor it refers to
///
/// Sets the relationship or reverts the field to a column; returns the
/// configuration problem, if any.
pub(crate) fn resolve_field(
    owner: &ModelDescriptor,
    field: &FieldDescriptor,
    related: &ModelDescriptor,
) -> Option<ConfigIssue> {
    let outcome = if field.field_type().slice_model().is_some() {
        resolve_slice(owner, field, related)
    } else {
        resolve_struct(owner, field, related)
    };

    match outcome {
        Ok(Some(relationship)) => {
            tracing::debug!(
                model = owner.type_name(),
                field = field.name(),
                kind = %relationship.kind,
                "Resolved relationship"
            );
            field.set_relationship(relationship);
            None
        }
        Ok(None) => {
            tracing::warn!(
                model = owner.type_name(),
                field = field.name(),
                "No foreign key matched, treating the field as a column"
            );
            field.mark_normal();
            None
        }
        Err(issue) => {
            tracing::warn!(
                model = owner.type_name(),
                field = field.name(),
                "{}",
                issue.message
            );
            field.mark_normal();
            Some(issue)
        }
    }
}

// ============================================================================
// Candidate Kinds
// ============================================================================

/// `Vec<T>` field: many-to-many or has-many
fn resolve_slice(
    owner: &ModelDescriptor,
    field: &FieldDescriptor,
    related: &ModelDescriptor,
) -> Result<Option<RelationshipDescriptor>, ConfigIssue> {
    if let Some(join_table) = field.tag_settings().non_empty(MANY2MANY) {
        return many_to_many(owner, field, related, join_table);
    }

    let polymorphic = Polymorphic::find(field.tag_settings(), related);
    let association_type = polymorphic
        .as_ref()
        .map_or(owner.type_name(), |p| p.association_type.as_str());

    let pairs = key_pairs(field, related, owner, association_type)?;
    Ok(materialize(RelationKind::HasMany, pairs, polymorphic.as_ref(), owner))
}

/// `T` field: has-one, else belongs-to
fn resolve_struct(
    owner: &ModelDescriptor,
    field: &FieldDescriptor,
    related: &ModelDescriptor,
) -> Result<Option<RelationshipDescriptor>, ConfigIssue> {
    let polymorphic = Polymorphic::find(field.tag_settings(), related);
    let association_type = polymorphic
        .as_ref()
        .map_or(owner.type_name(), |p| p.association_type.as_str());

    let pairs = key_pairs(field, related, owner, association_type)?;
    if let Some(relationship) =
        materialize(RelationKind::HasOne, pairs, polymorphic.as_ref(), owner)
    {
        return Ok(Some(relationship));
    }

    let pairs = key_pairs(field, owner, related, field.name())?;
    Ok(materialize(RelationKind::BelongsTo, pairs, None, owner))
}

/// `Vec<T>` field tagged `MANY2MANY`
///
/// Join columns are `<table>_<key column>` on both sides, each side keyed by
/// its `FOREIGNKEY` / `ASSOCIATIONFOREIGNKEY` list or its primary keys.
fn many_to_many(
    owner: &ModelDescriptor,
    field: &FieldDescriptor,
    related: &ModelDescriptor,
    join_table: &str,
) -> Result<Option<RelationshipDescriptor>, ConfigIssue> {
    let settings = field.tag_settings();
    let foreign_keys = settings.list(FOREIGNKEY);
    let association_keys = settings.list(ASSOCIATIONFOREIGNKEY);
    if !foreign_keys.is_empty()
        && !association_keys.is_empty()
        && foreign_keys.len() != association_keys.len()
    {
        return Err(ConfigIssue::new(field.name(), MISMATCHED_KEYS));
    }

    let sources = join_keys(owner, foreign_keys);
    let targets = join_keys(related, association_keys);
    if sources.is_empty() || targets.is_empty() {
        return Ok(None);
    }

    let mut relationship = RelationshipDescriptor::new(RelationKind::ManyToMany);
    let mut spec = JoinTableSpec {
        table_name: join_table.to_string(),
        source_keys: Vec::with_capacity(sources.len()),
        association_keys: Vec::with_capacity(targets.len()),
    };

    for key in sources {
        let column = format!("{}_{}", owner.table_name(), key.db_name());
        relationship.foreign_field_names.push(key.name().to_string());
        relationship.foreign_db_names.push(column.clone());
        spec.source_keys.push(JoinColumn {
            column,
            references: key.db_name().to_string(),
        });
    }

    for key in targets {
        let column = format!("{}_{}", related.table_name(), key.db_name());
        relationship
            .association_foreign_field_names
            .push(key.name().to_string());
        relationship.association_foreign_db_names.push(column.clone());
        spec.association_keys.push(JoinColumn {
            column,
            references: key.db_name().to_string(),
        });
    }

    relationship.join_table = Some(spec);
    Ok(Some(relationship))
}

fn join_keys(side: &ModelDescriptor, tagged: Vec<String>) -> Vec<&FieldDescriptor> {
    if tagged.is_empty() {
        side.primary_fields().collect()
    } else {
        tagged.iter().filter_map(|key| side.find_field(key)).collect()
    }
}

// ============================================================================
// Polymorphism
// ============================================================================

/// `POLYMORPHIC:<P>` with a `<P>Type` discriminator on the related model
struct Polymorphic<'a> {
    association_type: String,
    discriminator: &'a FieldDescriptor,
}

impl<'a> Polymorphic<'a> {
    fn find(settings: &TagSettings, related: &'a ModelDescriptor) -> Option<Self> {
        let association_type = settings.non_empty(POLYMORPHIC)?;
        let discriminator = related.find_field(&format!("{}Type", association_type))?;
        Some(Self {
            association_type: association_type.to_string(),
            discriminator,
        })
    }
}

// ============================================================================
// Key Resolution
// ============================================================================

/// Resolve the (foreign key, association key) pairs of a field
///
/// Foreign keys are looked up on `foreign`, association keys on
/// `association`; synthesized foreign-key names are `association_type`
/// followed by the association key. Pairs that fail on either side are
/// dropped.
fn key_pairs<'a>(
    field: &FieldDescriptor,
    foreign: &'a ModelDescriptor,
    association: &'a ModelDescriptor,
    association_type: &str,
) -> Result<KeyPairs<'a>, ConfigIssue> {
    let settings = field.tag_settings();
    let foreign_keys = settings.list(FOREIGNKEY);
    let association_keys = settings.list(ASSOCIATIONFOREIGNKEY);

    let names: Vec<(String, String)> = match (foreign_keys.is_empty(), association_keys.is_empty()) {
        // Convention: one foreign key per primary key of the association side
        (true, true) => association
            .primary_fields()
            .map(|p| (join_identifier(association_type, p.name()), p.name().to_string()))
            .collect(),

        // Association keys given, foreign keys synthesized from them
        (true, false) => association_keys
            .iter()
            .filter_map(|key| association.find_field(key))
            .map(|f| (join_identifier(association_type, f.name()), f.name().to_string()))
            .collect(),

        // Foreign keys given, association keys stripped from them
        (false, true) => {
            let mut names: Vec<(String, String)> = foreign_keys
                .iter()
                .filter_map(|key| {
                    let stripped = strip_identifier_prefix(key, association_type)?;
                    association.find_field(&stripped)?;
                    Some((key.clone(), stripped))
                })
                .collect();

            if names.is_empty() && foreign_keys.len() == 1 {
                if let Some(primary_key) = association.primary_key() {
                    names.push((foreign_keys[0].clone(), primary_key.to_string()));
                }
            }
            names
        }

        (false, false) => {
            if foreign_keys.len() != association_keys.len() {
                return Err(ConfigIssue::new(field.name(), MISMATCHED_KEYS));
            }
            foreign_keys.into_iter().zip(association_keys).collect()
        }
    };

    Ok(names
        .iter()
        .filter_map(|(foreign_key, association_key)| {
            Some((
                foreign.find_field(foreign_key)?,
                association.find_field(association_key)?,
            ))
        })
        .collect())
}

/// Build the relationship from resolved pairs, marking the foreign keys
///
/// Returns `None` when no pair resolved.
fn materialize(
    kind: RelationKind,
    pairs: KeyPairs<'_>,
    polymorphic: Option<&Polymorphic<'_>>,
    owner: &ModelDescriptor,
) -> Option<RelationshipDescriptor> {
    if pairs.is_empty() {
        return None;
    }

    let mut relationship = RelationshipDescriptor::new(kind);

    for (foreign, association) in pairs {
        foreign.mark_foreign_key();
        relationship.foreign_field_names.push(foreign.name().to_string());
        relationship.foreign_db_names.push(foreign.db_name().to_string());
        relationship
            .association_foreign_field_names
            .push(association.name().to_string());
        relationship
            .association_foreign_db_names
            .push(association.db_name().to_string());
    }

    if let Some(polymorphic) = polymorphic {
        polymorphic.discriminator.mark_foreign_key();
        relationship.polymorphic_type = Some(polymorphic.discriminator.name().to_string());
        relationship.polymorphic_db_name = Some(polymorphic.discriminator.db_name().to_string());
        relationship.polymorphic_value = Some(owner.table_name().to_string());
    }

    Some(relationship)
}

// ============================================================================
// Tests
// ============================================================================
