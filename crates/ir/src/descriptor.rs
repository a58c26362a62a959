//! Model and field descriptors
//!
//! A `ModelDescriptor` is the derived metadata of one model type: table
//! name, column mapping, primary keys and relationships. Descriptors are
//! shared as `Arc<ModelDescriptor>` and built in two passes. Between the
//! passes the descriptor is already visible to other types (tentative), so
//! the relationship slots and the two flags relationship inference sets on
//! other types' fields (`is_foreign_key`, `is_normal`) are write-once cells.

use crate::naming::to_db_name;
use crate::tags::TagSettings;
use ormeta_core::{ConfigIssue, FieldType, ModelRef, RelationKind};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// RelationshipDescriptor
// ============================================================================

/// A relationship inferred for a field
///
/// The foreign and association arrays are parallel: index `i` of
/// `foreign_db_names` pairs with index `i` of `association_foreign_db_names`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipDescriptor {
    /// Relationship kind
    pub kind: RelationKind,

    /// Discriminator field of a polymorphic relationship (e.g. "OwnerType")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polymorphic_type: Option<String>,

    /// Column of the discriminator field (e.g. "owner_type")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polymorphic_db_name: Option<String>,

    /// Value stored in the discriminator column: the owner's table name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polymorphic_value: Option<String>,

    /// Declared names of the foreign-key fields
    pub foreign_field_names: Vec<String>,

    /// Foreign-key columns (join-table columns for many-to-many)
    pub foreign_db_names: Vec<String>,

    /// Declared names of the referenced fields
    pub association_foreign_field_names: Vec<String>,

    /// Referenced columns (join-table columns for many-to-many)
    pub association_foreign_db_names: Vec<String>,

    /// Join table of a many-to-many relationship
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_table: Option<JoinTableSpec>,
}

impl RelationshipDescriptor {
    /// Create an empty relationship of the given kind
    pub fn new(kind: RelationKind) -> Self {
        Self {
            kind,
            polymorphic_type: None,
            polymorphic_db_name: None,
            polymorphic_value: None,
            foreign_field_names: Vec::new(),
            foreign_db_names: Vec::new(),
            association_foreign_field_names: Vec::new(),
            association_foreign_db_names: Vec::new(),
            join_table: None,
        }
    }

    /// Check if this is a polymorphic relationship
    pub fn is_polymorphic(&self) -> bool {
        self.polymorphic_type.is_some()
    }
}

/// A join-table column and the column it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinColumn {
    /// Column in the join table (e.g. "posts_id")
    pub column: String,
    /// Column it references on its side's table (e.g. "id")
    pub references: String,
}

/// The join table of a many-to-many relationship
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinTableSpec {
    /// Join table name
    pub table_name: String,
    /// Columns pointing at the owner's table
    pub source_keys: Vec<JoinColumn>,
    /// Columns pointing at the associated table
    pub association_keys: Vec<JoinColumn>,
}

impl JoinTableSpec {
    /// Join-table columns on the owner side
    pub fn source_columns(&self) -> Vec<&str> {
        self.source_keys.iter().map(|k| k.column.as_str()).collect()
    }

    /// Join-table columns on the associated side
    pub fn association_columns(&self) -> Vec<&str> {
        self.association_keys.iter().map(|k| k.column.as_str()).collect()
    }
}

// ============================================================================
// FieldDescriptor
// ============================================================================

/// Derived metadata of one field
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) names: Vec<String>,
    pub(crate) db_name: String,
    pub(crate) field_type: FieldType,
    pub(crate) tag_settings: TagSettings,
    pub(crate) is_primary_key: bool,
    pub(crate) is_ignored: bool,
    pub(crate) is_scanner: bool,
    pub(crate) has_default_value: bool,
    is_foreign_key: AtomicBool,
    is_normal: AtomicBool,
    relationship: OnceLock<RelationshipDescriptor>,
}

impl FieldDescriptor {
    pub(crate) fn new(
        name: impl Into<String>,
        db_name: impl Into<String>,
        field_type: FieldType,
        tag_settings: TagSettings,
    ) -> Self {
        let name = name.into();
        Self {
            names: vec![name.clone()],
            name,
            db_name: db_name.into(),
            field_type,
            tag_settings,
            is_primary_key: false,
            is_ignored: false,
            is_scanner: false,
            has_default_value: false,
            is_foreign_key: AtomicBool::new(false),
            is_normal: AtomicBool::new(false),
            relationship: OnceLock::new(),
        }
    }

    /// Declared field name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name chain from the model down to this field
    ///
    /// Fields promoted out of an embedded model are prefixed by the
    /// embedding field: `["Base", "ID"]`.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Dotted form of the name chain ("Base.ID")
    pub fn path(&self) -> String {
        self.names.join(".")
    }

    /// Column name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Declared type
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Parsed annotations
    pub fn tag_settings(&self) -> &TagSettings {
        &self.tag_settings
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    /// Excluded from the schema by the `-` annotation
    pub fn is_ignored(&self) -> bool {
        self.is_ignored
    }

    /// Holds a key of some relationship
    pub fn is_foreign_key(&self) -> bool {
        self.is_foreign_key.load(Ordering::Relaxed)
    }

    /// Stored through a custom representation
    pub fn is_scanner(&self) -> bool {
        self.is_scanner
    }

    /// A plain column (not ignored, not a relationship)
    pub fn is_normal(&self) -> bool {
        self.is_normal.load(Ordering::Relaxed)
    }

    pub fn has_default_value(&self) -> bool {
        self.has_default_value
    }

    /// Inferred relationship, if any
    pub fn relationship(&self) -> Option<&RelationshipDescriptor> {
        self.relationship.get()
    }

    pub(crate) fn mark_foreign_key(&self) {
        self.is_foreign_key.store(true, Ordering::Relaxed);
    }

    pub(crate) fn mark_normal(&self) {
        self.is_normal.store(true, Ordering::Relaxed);
    }

    /// Attach a relationship; the first one wins
    pub(crate) fn set_relationship(&self, relationship: RelationshipDescriptor) -> bool {
        self.relationship.set(relationship).is_ok()
    }

    /// Check if `candidate` names this field
    ///
    /// Matches the declared name, the column name, or the column form of
    /// the candidate, so "OwnerID", "owner_id" and "Owner_id" all find the
    /// `owner_id` column.
    pub fn matches(&self, candidate: &str) -> bool {
        self.name == candidate || self.db_name == candidate || self.db_name == to_db_name(candidate)
    }
}

impl Clone for FieldDescriptor {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            names: self.names.clone(),
            db_name: self.db_name.clone(),
            field_type: self.field_type.clone(),
            tag_settings: self.tag_settings.clone(),
            is_primary_key: self.is_primary_key,
            is_ignored: self.is_ignored,
            is_scanner: self.is_scanner,
            has_default_value: self.has_default_value,
            is_foreign_key: AtomicBool::new(self.is_foreign_key()),
            is_normal: AtomicBool::new(self.is_normal()),
            relationship: self.relationship.clone(),
        }
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("db_name", &self.db_name)
            .field("field_type", &self.field_type.to_string())
            .field("is_primary_key", &self.is_primary_key)
            .field("is_ignored", &self.is_ignored)
            .field("is_foreign_key", &self.is_foreign_key())
            .field("is_normal", &self.is_normal())
            .field("relationship", &self.relationship())
            .finish()
    }
}

impl Serialize for FieldDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldDescriptor", 12)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("names", &self.names)?;
        state.serialize_field("db_name", &self.db_name)?;
        state.serialize_field("field_type", &self.field_type)?;
        state.serialize_field("tag_settings", &self.tag_settings)?;
        state.serialize_field("is_primary_key", &self.is_primary_key)?;
        state.serialize_field("is_ignored", &self.is_ignored)?;
        state.serialize_field("is_foreign_key", &self.is_foreign_key())?;
        state.serialize_field("is_scanner", &self.is_scanner)?;
        state.serialize_field("is_normal", &self.is_normal())?;
        state.serialize_field("has_default_value", &self.has_default_value)?;
        state.serialize_field("relationship", &self.relationship())?;
        state.end()
    }
}

// ============================================================================
// ModelDescriptor
// ============================================================================

/// Derived metadata of one model type
pub struct ModelDescriptor {
    model: ModelRef,
    type_name: &'static str,
    table_name: String,
    fields: Vec<FieldDescriptor>,
    primary_fields: Vec<usize>,
    issues: OnceLock<Vec<ConfigIssue>>,
}

impl ModelDescriptor {
    pub(crate) fn new(
        model: ModelRef,
        type_name: &'static str,
        table_name: String,
        fields: Vec<FieldDescriptor>,
    ) -> Self {
        let primary_fields = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_primary_key)
            .map(|(i, _)| i)
            .collect();

        Self {
            model,
            type_name,
            table_name,
            fields,
            primary_fields,
            issues: OnceLock::new(),
        }
    }

    /// Handle of the described type
    pub fn model(&self) -> ModelRef {
        self.model
    }

    /// Declared type name
    pub fn type_name(&self) -> &str {
        self.type_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All fields in declaration order, embedded fields spliced in place
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Primary-key fields, in declaration order
    pub fn primary_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.primary_fields.iter().map(|&i| &self.fields[i])
    }

    /// First primary-key field
    pub fn primary_field(&self) -> Option<&FieldDescriptor> {
        self.primary_fields().next()
    }

    /// Column of the first primary-key field
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_field().map(FieldDescriptor::db_name)
    }

    /// Field with exactly this declared name
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field named by `candidate` under the key-matching rule
    /// (see [`FieldDescriptor::matches`])
    pub fn find_field(&self, candidate: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.matches(candidate))
    }

    /// Columns of the table: fields that are neither ignored nor relationships
    pub fn columns(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_normal() && !f.is_ignored)
    }

    /// Fields carrying a relationship
    pub fn relationships(
        &self,
    ) -> impl Iterator<Item = (&FieldDescriptor, &RelationshipDescriptor)> {
        self.fields
            .iter()
            .filter_map(|f| f.relationship().map(|r| (f, r)))
    }

    /// Relationship of the named field
    pub fn relationship(&self, field_name: &str) -> Option<&RelationshipDescriptor> {
        self.field_by_name(field_name)
            .and_then(FieldDescriptor::relationship)
    }

    /// Check if relationship resolution has completed
    pub fn is_finalized(&self) -> bool {
        self.issues.get().is_some()
    }

    /// Relationship configuration problems found while building
    pub fn issues(&self) -> &[ConfigIssue] {
        self.issues.get().map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn finalize(&self, issues: Vec<ConfigIssue>) {
        let _ = self.issues.set(issues);
    }
}

impl std::fmt::Debug for ModelDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("type_name", &self.type_name)
            .field("table_name", &self.table_name)
            .field("fields", &self.fields)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

impl Serialize for ModelDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let primary_keys: Vec<&str> = self.primary_fields().map(FieldDescriptor::db_name).collect();

        let mut state = serializer.serialize_struct("ModelDescriptor", 5)?;
        state.serialize_field("type_name", self.type_name)?;
        state.serialize_field("table_name", &self.table_name)?;
        state.serialize_field("primary_keys", &primary_keys)?;
        state.serialize_field("fields", &self.fields)?;
        state.serialize_field("issues", self.issues())?;
        state.end()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ormeta_core::{Model, ModelSchema, ScalarKind};

    struct Account;

    impl Model for Account {
        fn schema() -> ModelSchema {
            ModelSchema::new("Account")
        }
    }

    fn field(name: &str, db_name: &str) -> FieldDescriptor {
        FieldDescriptor::new(
            name,
            db_name,
            FieldType::Scalar(ScalarKind::Uint32),
            TagSettings::default(),
        )
    }

    fn account() -> ModelDescriptor {
        let mut id = field("ID", "id");
        id.is_primary_key = true;
        id.mark_normal();
        let owner = field("OwnerID", "owner_id");
        owner.mark_normal();
        let mut secret = field("Secret", "secret");
        secret.is_ignored = true;

        ModelDescriptor::new(
            ModelRef::of::<Account>(),
            "Account",
            "accounts".to_string(),
            vec![id, owner, secret],
        )
    }

    #[test]
    fn test_find_field_matching_rule() {
        let desc = account();
        assert_eq!(desc.find_field("OwnerID").map(|f| f.name()), Some("OwnerID"));
        assert_eq!(desc.find_field("owner_id").map(|f| f.name()), Some("OwnerID"));
        assert_eq!(desc.find_field("Owner_id").map(|f| f.name()), Some("OwnerID"));
        assert!(desc.find_field("CreatorID").is_none());
        assert!(desc.field_by_name("owner_id").is_none());
    }

    #[test]
    fn test_primary_fields() {
        let desc = account();
        assert_eq!(desc.primary_key(), Some("id"));
        assert_eq!(desc.primary_fields().count(), 1);
    }

    #[test]
    fn test_columns_skip_ignored() {
        let desc = account();
        let columns: Vec<&str> = desc.columns().map(|f| f.db_name()).collect();
        assert_eq!(columns, vec!["id", "owner_id"]);
    }

    #[test]
    fn test_flags_are_monotonic() {
        let f = field("OwnerID", "owner_id");
        assert!(!f.is_foreign_key());
        f.mark_foreign_key();
        f.mark_foreign_key();
        assert!(f.is_foreign_key());

        assert!(f.set_relationship(RelationshipDescriptor::new(RelationKind::HasOne)));
        assert!(!f.set_relationship(RelationshipDescriptor::new(RelationKind::HasMany)));
        assert_eq!(f.relationship().map(|r| r.kind), Some(RelationKind::HasOne));
    }

    #[test]
    fn test_clone_keeps_flags() {
        let f = field("OwnerID", "owner_id");
        f.mark_foreign_key();
        let copy = f.clone();
        assert!(copy.is_foreign_key());
        assert!(!copy.is_normal());
    }

    #[test]
    fn test_finalize_once() {
        let desc = account();
        assert!(!desc.is_finalized());
        assert!(desc.issues().is_empty());

        desc.finalize(vec![ConfigIssue::new("Children", "bad")]);
        desc.finalize(Vec::new());
        assert!(desc.is_finalized());
        assert_eq!(desc.issues().len(), 1);
    }

    #[test]
    fn test_serialize_descriptor() {
        let desc = account();
        desc.finalize(Vec::new());
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["table_name"], "accounts");
        assert_eq!(json["primary_keys"][0], "id");
        assert_eq!(json["fields"][1]["db_name"], "owner_id");
        assert_eq!(json["fields"][2]["is_ignored"], true);
        assert!(json["fields"][0]["relationship"].is_null());
    }
}
