//! Model declarations
//!
//! A `ModelSchema` is the declared shape of a model type: its name, an
//! optional explicit table name, and its fields in declaration order, each
//! with a `FieldType` and raw tag annotations. It is what `#[derive(Model)]`
//! generates and what hand-written `Model` impls build with the builder
//! methods below.

use crate::traits::{FieldKind, Model};
use crate::types::FieldType;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

// ============================================================================
// ModelSchema
// ============================================================================

/// The declared shape of a model type
#[derive(Debug, Clone)]
pub struct ModelSchema {
    /// Type name, as written in the declaration (e.g. "User")
    pub type_name: &'static str,

    /// Explicit table name, overriding the naming convention
    pub table_name: Option<String>,

    /// Fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl ModelSchema {
    /// Start a declaration for the named type
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            table_name: None,
            fields: Vec::new(),
        }
    }

    /// Set an explicit table name
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Append a field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }
}

// ============================================================================
// FieldDef
// ============================================================================

/// A declared field of a model
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Declared field name
    pub name: String,

    /// Declared type
    pub field_type: FieldType,

    /// Raw annotations as `(channel, value)` pairs, e.g. `("sql", "not null")`
    pub tags: Vec<(String, String)>,

    /// Whether the field is an anonymous composition of another model,
    /// whose columns are promoted into the owner
    pub anonymous: bool,
}

impl FieldDef {
    /// Create a field with an explicit type
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            tags: Vec::new(),
            anonymous: false,
        }
    }

    /// Create a field whose type is derived from a Rust type
    pub fn of<T: FieldKind>(name: impl Into<String>) -> Self {
        Self::new(name, T::field_type())
    }

    /// Attach a raw annotation on the given channel
    pub fn tag(mut self, channel: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((channel.into(), value.into()));
        self
    }

    /// Attach a raw annotation on the `sql` channel
    pub fn sql(self, value: impl Into<String>) -> Self {
        self.tag("sql", value)
    }

    /// Attach a raw annotation on the `orm` channel
    pub fn orm(self, value: impl Into<String>) -> Self {
        self.tag("orm", value)
    }

    /// Mark the field as an anonymous composition
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// Raw annotations declared on a channel, in declaration order
    pub fn tags_on<'a>(&'a self, channel: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |(c, _)| c == channel)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// ModelRef
// ============================================================================

/// A handle on a model type: its identity plus a way to obtain its schema
///
/// Schemas are produced on demand, so two models can refer to each other
/// without either declaration recursing into the other.
#[derive(Clone, Copy)]
pub struct ModelRef {
    type_id: TypeId,
    rust_name: &'static str,
    schema: fn() -> ModelSchema,
}

impl ModelRef {
    /// Handle for the model type `T`
    pub fn of<T: Model>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            rust_name: std::any::type_name::<T>(),
            schema: T::schema,
        }
    }

    /// Identity of the model type
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully qualified Rust type name
    pub fn rust_name(&self) -> &'static str {
        self.rust_name
    }

    /// Last path segment of the Rust type name
    pub fn short_name(&self) -> &'static str {
        self.rust_name
            .rsplit("::")
            .next()
            .unwrap_or(self.rust_name)
    }

    /// Produce the model's declaration
    pub fn schema(&self) -> ModelSchema {
        (self.schema)()
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModelRef {}

impl Hash for ModelRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelRef").field(&self.rust_name).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarKind;

    struct Widget;

    impl Model for Widget {
        fn schema() -> ModelSchema {
            ModelSchema::new("Widget")
                .with_table_name("gadgets")
                .field(FieldDef::of::<u32>("ID").sql("primary_key"))
                .field(FieldDef::of::<String>("Name").sql("not null").orm("size:64"))
        }
    }

    struct Other;

    impl Model for Other {
        fn schema() -> ModelSchema {
            ModelSchema::new("Other")
        }
    }

    #[test]
    fn test_schema_builder() {
        let schema = Widget::schema();
        assert_eq!(schema.type_name, "Widget");
        assert_eq!(schema.table_name.as_deref(), Some("gadgets"));
        assert_eq!(schema.fields.len(), 2);

        let name = &schema.fields[1];
        assert_eq!(name.name, "Name");
        assert_eq!(name.field_type, FieldType::Scalar(ScalarKind::String));
        assert_eq!(name.tags_on("sql").collect::<Vec<_>>(), vec!["not null"]);
        assert_eq!(name.tags_on("orm").collect::<Vec<_>>(), vec!["size:64"]);
    }

    #[test]
    fn test_field_def_anonymous() {
        let field = FieldDef::new("Base", FieldType::Model(ModelRef::of::<Other>())).anonymous();
        assert!(field.anonymous);
        assert!(field.tags.is_empty());
    }

    #[test]
    fn test_model_ref_identity() {
        let a = ModelRef::of::<Widget>();
        let b = ModelRef::of::<Widget>();
        let c = ModelRef::of::<Other>();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.short_name(), "Widget");
        assert_eq!(a.schema().type_name, "Widget");
    }
}
