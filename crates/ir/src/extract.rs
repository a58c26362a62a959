//! Field extraction
//!
//! First construction pass: turns a `ModelSchema` into the model's table
//! name and field list. Plain columns, scanners and time values are settled
//! here; embedded models are flattened into the owner; fields holding other
//! models are left as relationship candidates for the second pass.

use crate::descriptor::{FieldDescriptor, ModelDescriptor};
use crate::naming;
use crate::registry::BuildContext;
use crate::tags::{DEFAULT, EMBEDDED, PRIMARY_KEY, TagSettings};
use ormeta_core::{FieldDef, ModelRef};

/// How a declared field takes part in the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldRole {
    /// Stored through its own representation
    Scanner,
    /// A plain column
    Scalar,
    /// Columns promoted from another model
    Embedded(ModelRef),
    /// Holds other models; resolved in the relationship pass
    Candidate,
}

fn classify(def: &FieldDef, settings: &TagSettings) -> FieldRole {
    let field_type = &def.field_type;

    if field_type.is_scanner() {
        return FieldRole::Scanner;
    }
    if field_type.is_time() {
        return FieldRole::Scalar;
    }
    if settings.contains(EMBEDDED) || def.anonymous {
        match field_type.model_ref() {
            Some(model) => return FieldRole::Embedded(*model),
            None => tracing::warn!(
                field = %def.name,
                field_type = %field_type,
                "Embedded field does not hold a model, treating it as a column"
            ),
        }
    }
    if field_type.slice_model().is_some() || field_type.model_ref().is_some() {
        return FieldRole::Candidate;
    }
    FieldRole::Scalar
}

/// Build the tentative descriptor of `model`
///
/// Embedded models are resolved through `ctx` and must not be the model
/// under construction; such a cycle is reported and the field kept as a
/// column.
pub(crate) fn extract(ctx: &mut BuildContext<'_>, model: ModelRef) -> ModelDescriptor {
    let schema = model.schema();
    let table_name = naming::table_name(
        schema.type_name,
        schema.table_name.as_deref(),
        ctx.config().singular_table,
        ctx.hook(),
    );

    tracing::debug!(model = schema.type_name, table = %table_name, "Extracting fields");

    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(schema.fields.len());

    for def in &schema.fields {
        let settings = TagSettings::from_field(def);
        let db_name = naming::column_name(&def.name, &settings);
        let mut field = FieldDescriptor::new(&def.name, db_name, def.field_type.clone(), settings);

        if field.tag_settings.is_ignored() {
            field.is_ignored = true;
            fields.push(field);
            continue;
        }

        field.is_primary_key = field.tag_settings.contains(PRIMARY_KEY);
        field.has_default_value = field.tag_settings.contains(DEFAULT);

        match classify(def, &field.tag_settings) {
            FieldRole::Scanner => {
                field.is_scanner = true;
                field.mark_normal();
            }
            FieldRole::Scalar => field.mark_normal(),
            FieldRole::Candidate => {}
            FieldRole::Embedded(embedded) => match ctx.resolve(embedded) {
                Some(descriptor) => {
                    tracing::trace!(
                        model = schema.type_name,
                        field = %def.name,
                        embedded = descriptor.type_name(),
                        "Promoting embedded fields"
                    );
                    for sub in descriptor.fields() {
                        let mut promoted = sub.clone();
                        promoted.names.insert(0, def.name.clone());
                        fields.push(promoted);
                    }
                    continue;
                }
                None => {
                    tracing::warn!(
                        model = schema.type_name,
                        field = %def.name,
                        "Embedded model is still being built (cyclic embedding), treating it as a column"
                    );
                    field.mark_normal();
                }
            },
        }

        tracing::trace!(
            model = schema.type_name,
            field = %field.name,
            column = %field.db_name,
            primary_key = field.is_primary_key,
            "Extracted field"
        );
        fields.push(field);
    }

    if !fields.iter().any(|f| f.is_primary_key) {
        if let Some(id) = fields.iter_mut().find(|f| {
            !f.is_ignored && (f.name.eq_ignore_ascii_case("id") || f.db_name.eq_ignore_ascii_case("id"))
        }) {
            id.is_primary_key = true;
        }
    }

    ModelDescriptor::new(model, schema.type_name, table_name, fields)
}

// ============================================================================
// Tests
// ============================================================================
