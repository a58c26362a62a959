//! Column definitions
//!
//! Combines a dialect's type mapping with the field's tag annotations:
//! a `TYPE` tag replaces the mapped type, and `NOT NULL`, `UNIQUE` and
//! `DEFAULT` are appended as written.

use crate::Dialect;
use ormeta_core::{EngineResult, FieldType};
use ormeta_ir::tags::{AUTO_INCREMENT, DEFAULT, NOT_NULL, SIZE, TYPE, UNIQUE};
use ormeta_ir::{FieldDescriptor, ModelDescriptor};
use serde::Serialize;

/// Size of string and byte columns without a `SIZE` tag
pub const DEFAULT_SIZE: usize = 255;

// ============================================================================
// ColumnSpec
// ============================================================================

/// What a dialect needs to know to pick a column type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec<'a> {
    /// Declared field name, for error messages
    pub field_name: &'a str,

    /// Type values are stored as (scanner wrappers removed)
    pub field_type: &'a FieldType,

    /// Declared size; 0 when the `SIZE` tag is not a number
    pub size: usize,

    /// Whether the column generates its own values
    pub auto_increment: bool,
}

impl<'a> ColumnSpec<'a> {
    /// A column of the given type with the default size
    pub fn new(field_name: &'a str, field_type: &'a FieldType) -> Self {
        Self {
            field_name,
            field_type: field_type.storage_type(),
            size: DEFAULT_SIZE,
            auto_increment: false,
        }
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn with_auto_increment(mut self, auto_increment: bool) -> Self {
        self.auto_increment = auto_increment;
        self
    }

    /// Column spec of a descriptor field
    ///
    /// Primary keys auto-increment unless tagged `AUTO_INCREMENT:false`.
    pub fn from_field(field: &'a FieldDescriptor) -> Self {
        let settings = field.tag_settings();

        let size = match settings.get(SIZE) {
            Some(value) => value.trim().parse().unwrap_or(0),
            None => DEFAULT_SIZE,
        };

        let auto_increment = match settings.get(AUTO_INCREMENT) {
            Some(value) if value.eq_ignore_ascii_case("false") => false,
            Some(_) => true,
            None => field.is_primary_key(),
        };

        Self::new(field.name(), field.field_type())
            .with_size(size)
            .with_auto_increment(auto_increment)
    }
}

// ============================================================================
// Column Definitions
// ============================================================================

/// A column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Type and constraints, e.g. "varchar(100) NOT NULL"
    pub sql_type: String,
    /// Part of the primary key
    pub primary_key: bool,
}

/// Type and constraints of a field's column
///
/// Returns `None` for fields without a column: ignored fields and
/// relationships.
pub fn column_definition(
    dialect: &dyn Dialect,
    field: &FieldDescriptor,
) -> EngineResult<Option<String>> {
    if field.is_ignored() || !field.is_normal() {
        return Ok(None);
    }

    let settings = field.tag_settings();
    let sql_type = match settings.non_empty(TYPE) {
        Some(explicit) => explicit.to_string(),
        None => dialect.sql_type(&ColumnSpec::from_field(field))?,
    };

    let mut parts = vec![sql_type];
    parts.extend(settings.non_empty(NOT_NULL).map(ToString::to_string));
    parts.extend(settings.non_empty(UNIQUE).map(ToString::to_string));
    if let Some(value) = settings.get(DEFAULT) {
        parts.push(format!("DEFAULT {}", value));
    }

    Ok(Some(parts.join(" ")))
}

/// Every column of a model, in field order
///
/// Stops at the first field the dialect cannot represent.
pub fn table_columns(
    dialect: &dyn Dialect,
    descriptor: &ModelDescriptor,
) -> EngineResult<Vec<ColumnDefinition>> {
    let mut columns = Vec::new();

    for field in descriptor.fields() {
        if let Some(sql_type) = column_definition(dialect, field)? {
            columns.push(ColumnDefinition {
                name: field.db_name().to_string(),
                sql_type,
                primary_key: field.is_primary_key(),
            });
        }
    }

    tracing::debug!(
        dialect = dialect.name(),
        table = descriptor.table_name(),
        columns = columns.len(),
        "Mapped columns"
    );

    Ok(columns)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect_for;
    use ormeta_core::{DatabaseType, FieldDef, Hstore, Model, ModelSchema, ScalarKind};
    use ormeta_ir::Registry;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct Article;

    impl Model for Article {
        fn schema() -> ModelSchema {
            ModelSchema::new("Article")
                .field(FieldDef::of::<u64>("ID"))
                .field(FieldDef::of::<String>("Title").sql("size:100;not null"))
                .field(FieldDef::of::<String>("Slug").sql("type:citext;unique"))
                .field(FieldDef::of::<String>("Status").sql("default:'draft'"))
                .field(FieldDef::of::<Hstore>("Meta"))
                .field(FieldDef::of::<String>("Body").sql("size:70000"))
                .field(FieldDef::of::<u32>("Views").sql("auto_increment"))
                .field(FieldDef::of::<String>("Draft").sql("-"))
                .field(FieldDef::new("Comments", FieldType::slice(FieldType::model::<Comment>())))
        }
    }

    struct Comment;

    impl Model for Comment {
        fn schema() -> ModelSchema {
            ModelSchema::new("Comment")
                .field(FieldDef::of::<u32>("ID").sql("auto_increment:FALSE"))
                .field(FieldDef::of::<u64>("ArticleID"))
                .field(FieldDef::of::<String>("Author").sql("size:abc"))
        }
    }

    struct Settings;

    impl Model for Settings {
        fn schema() -> ModelSchema {
            ModelSchema::new("Settings")
                .field(FieldDef::of::<u32>("ID"))
                .field(FieldDef::of::<HashMap<String, String>>("Values"))
        }
    }

    #[test]
    fn test_column_spec_from_field() {
        let registry = Registry::new();
        let comment = registry.descriptor::<Comment>().unwrap();

        let id = ColumnSpec::from_field(comment.field_by_name("ID").unwrap());
        assert!(!id.auto_increment);

        let author = ColumnSpec::from_field(comment.field_by_name("Author").unwrap());
        assert_eq!(author.size, 0);
        assert_eq!(author.field_type, &FieldType::Scalar(ScalarKind::String));

        let article = registry.descriptor::<Article>().unwrap();
        let id = ColumnSpec::from_field(article.field_by_name("ID").unwrap());
        assert!(id.auto_increment);
        assert_eq!(id.size, DEFAULT_SIZE);

        let meta = ColumnSpec::from_field(article.field_by_name("Meta").unwrap());
        assert_eq!(meta.field_type, &FieldType::Hstore);
    }

    #[test]
    fn test_postgres_table_columns() {
        let registry = Registry::new();
        let article = registry.descriptor::<Article>().unwrap();
        let columns = table_columns(dialect_for(DatabaseType::PostgreSQL), &article).unwrap();

        let rendered: Vec<(&str, &str)> = columns
            .iter()
            .map(|c| (c.name.as_str(), c.sql_type.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("id", "bigserial"),
                ("title", "varchar(100) NOT NULL"),
                ("slug", "citext UNIQUE"),
                ("status", "varchar(255) DEFAULT 'draft'"),
                ("meta", "hstore"),
                ("body", "text"),
                ("views", "serial"),
            ]
        );
        assert!(columns[0].primary_key);
        assert!(!columns[1].primary_key);
    }

    #[test]
    fn test_relationship_and_ignored_fields_have_no_column() {
        let registry = Registry::new();
        let article = registry.descriptor::<Article>().unwrap();
        let dialect = dialect_for(DatabaseType::PostgreSQL);

        let comments = article.field_by_name("Comments").unwrap();
        assert!(comments.relationship().is_some());
        assert_eq!(column_definition(dialect, comments).unwrap(), None);

        let draft = article.field_by_name("Draft").unwrap();
        assert_eq!(column_definition(dialect, draft).unwrap(), None);
    }

    #[test]
    fn test_unsupported_type_is_reported() {
        let registry = Registry::new();
        let settings = registry.descriptor::<Settings>().unwrap();

        let err = table_columns(dialect_for(DatabaseType::PostgreSQL), &settings).unwrap_err();
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("'Values'"));
    }

    #[test]
    fn test_hstore_only_on_postgres() {
        let registry = Registry::new();
        let article = registry.descriptor::<Article>().unwrap();
        let meta = article.field_by_name("Meta").unwrap();

        assert!(column_definition(dialect_for(DatabaseType::MySQL), meta).is_err());
        assert!(column_definition(dialect_for(DatabaseType::SQLite), meta).is_err());
    }
}
