//! Core types used throughout ormeta
//!
//! This module contains the field type model that a model declaration is
//! expressed in, the relationship kinds the metadata engine infers, and the
//! database targets the dialect mappers support.

use crate::schema::ModelRef;
use crate::traits::Model;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Scalar Kinds
// ============================================================================

/// Primitive value kinds a field can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    /// Pointer-sized signed integer
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    /// Pointer-sized unsigned integer
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
}

impl ScalarKind {
    /// Rust spelling of the kind
    pub fn rust_name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "isize",
            ScalarKind::Int8 => "i8",
            ScalarKind::Int16 => "i16",
            ScalarKind::Int32 => "i32",
            ScalarKind::Int64 => "i64",
            ScalarKind::Uint => "usize",
            ScalarKind::Uint8 => "u8",
            ScalarKind::Uint16 => "u16",
            ScalarKind::Uint32 => "u32",
            ScalarKind::Uint64 => "u64",
            ScalarKind::Float32 => "f32",
            ScalarKind::Float64 => "f64",
            ScalarKind::String => "String",
        }
    }

    /// Integers that fit a 32-bit column
    pub fn is_narrow_integer(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int
                | ScalarKind::Int8
                | ScalarKind::Int16
                | ScalarKind::Int32
                | ScalarKind::Uint
                | ScalarKind::Uint8
                | ScalarKind::Uint16
                | ScalarKind::Uint32
        )
    }

    /// Integers that need a 64-bit column
    pub fn is_wide_integer(&self) -> bool {
        matches!(self, ScalarKind::Int64 | ScalarKind::Uint64)
    }

    /// Floating point kinds
    pub fn is_float(&self) -> bool {
        matches!(self, ScalarKind::Float32 | ScalarKind::Float64)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

// ============================================================================
// Field Types
// ============================================================================

/// The declared shape of a field, as seen by the metadata engine
///
/// Pointer-like wrappers (`Option<T>`, `Box<T>`) are transparent: they
/// report the type they point to.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// A primitive value
    Scalar(ScalarKind),
    /// A point in time
    Time,
    /// A UUID value
    Uuid,
    /// A PostgreSQL `hstore` key/value map
    Hstore,
    /// Any other map
    Map {
        key: Box<FieldType>,
        value: Box<FieldType>,
    },
    /// A growable sequence
    Slice(Box<FieldType>),
    /// A fixed-length sequence
    Array { elem: Box<FieldType>, len: usize },
    /// Another model type
    Model(ModelRef),
    /// A type that converts itself to and from a storage representation
    Scanner(Box<FieldType>),
}

impl FieldType {
    /// Declare a scanner type stored as `representation`
    pub fn scanner(representation: FieldType) -> Self {
        FieldType::Scanner(Box::new(representation))
    }

    /// Declare a field holding the model `T`
    pub fn model<T: Model>() -> Self {
        FieldType::Model(ModelRef::of::<T>())
    }

    /// Declare a slice of `elem`
    pub fn slice(elem: FieldType) -> Self {
        FieldType::Slice(Box::new(elem))
    }

    /// Check if this is a scanner type
    pub fn is_scanner(&self) -> bool {
        matches!(self, FieldType::Scanner(_))
    }

    /// Check if this is a time type
    pub fn is_time(&self) -> bool {
        matches!(self, FieldType::Time)
    }

    /// The referenced model, if this field holds one directly
    pub fn model_ref(&self) -> Option<&ModelRef> {
        match self {
            FieldType::Model(model) => Some(model),
            _ => None,
        }
    }

    /// The element model of a (possibly nested) slice of models
    pub fn slice_model(&self) -> Option<&ModelRef> {
        let mut current = self;
        while let FieldType::Slice(elem) = current {
            current = elem.as_ref();
        }
        match (self, current) {
            (FieldType::Slice(_), FieldType::Model(model)) => Some(model),
            _ => None,
        }
    }

    /// The type values are stored as, looking through scanner wrappers
    pub fn storage_type(&self) -> &FieldType {
        let mut current = self;
        while let FieldType::Scanner(inner) = current {
            current = inner.as_ref();
        }
        current
    }

    /// Check if this is a byte slice or byte array
    pub fn is_bytes(&self) -> bool {
        match self {
            FieldType::Slice(elem) | FieldType::Array { elem, .. } => {
                matches!(**elem, FieldType::Scalar(ScalarKind::Uint8))
            }
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(kind) => write!(f, "{}", kind),
            FieldType::Time => write!(f, "DateTime"),
            FieldType::Uuid => write!(f, "Uuid"),
            FieldType::Hstore => write!(f, "Hstore"),
            FieldType::Map { key, value } => write!(f, "HashMap<{}, {}>", key, value),
            FieldType::Slice(elem) => write!(f, "Vec<{}>", elem),
            FieldType::Array { elem, len } => write!(f, "[{}; {}]", elem, len),
            FieldType::Model(model) => write!(f, "{}", model.short_name()),
            FieldType::Scanner(inner) => write!(f, "Scanner<{}>", inner),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// Relationship Kinds
// ============================================================================

/// Relationship kinds inferred between models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// The other model holds a key pointing back at the owner
    HasOne,
    /// Many rows of the other model point back at the owner
    HasMany,
    /// The owner holds a key pointing at the other model
    BelongsTo,
    /// Key pairs live in a join table
    ManyToMany,
}

impl RelationKind {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "has one",
            RelationKind::HasMany => "has many",
            RelationKind::BelongsTo => "belongs to",
            RelationKind::ManyToMany => "many to many",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Database Types
// ============================================================================

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    #[default]
    #[serde(alias = "postgres")]
    PostgreSQL,
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            DatabaseType::PostgreSQL => "PostgreSQL",
            DatabaseType::MySQL => "MySQL",
            DatabaseType::SQLite => "SQLite",
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DatabaseType::PostgreSQL),
            "mysql" => Ok(DatabaseType::MySQL),
            "sqlite" | "sqlite3" => Ok(DatabaseType::SQLite),
            other => Err(format!("unknown database type '{}'", other)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_kind_widths() {
        assert!(ScalarKind::Uint32.is_narrow_integer());
        assert!(ScalarKind::Int.is_narrow_integer());
        assert!(!ScalarKind::Int64.is_narrow_integer());
        assert!(ScalarKind::Uint64.is_wide_integer());
        assert!(ScalarKind::Float32.is_float());
        assert!(!ScalarKind::String.is_float());
    }

    #[test]
    fn test_field_type_display() {
        assert_eq!(FieldType::Scalar(ScalarKind::Int64).to_string(), "i64");
        assert_eq!(
            FieldType::slice(FieldType::Scalar(ScalarKind::Uint8)).to_string(),
            "Vec<u8>"
        );
        assert_eq!(
            FieldType::scanner(FieldType::Scalar(ScalarKind::String)).to_string(),
            "Scanner<String>"
        );
        assert_eq!(
            FieldType::Array {
                elem: Box::new(FieldType::Scalar(ScalarKind::Uint8)),
                len: 16
            }
            .to_string(),
            "[u8; 16]"
        );
    }

    #[test]
    fn test_storage_type_unwraps_scanners() {
        let nested = FieldType::scanner(FieldType::scanner(FieldType::Hstore));
        assert_eq!(nested.storage_type(), &FieldType::Hstore);
        assert_eq!(FieldType::Time.storage_type(), &FieldType::Time);
    }

    #[test]
    fn test_is_bytes() {
        assert!(FieldType::slice(FieldType::Scalar(ScalarKind::Uint8)).is_bytes());
        assert!(
            FieldType::Array {
                elem: Box::new(FieldType::Scalar(ScalarKind::Uint8)),
                len: 4
            }
            .is_bytes()
        );
        assert!(!FieldType::slice(FieldType::Scalar(ScalarKind::Int8)).is_bytes());
        assert!(!FieldType::Scalar(ScalarKind::Uint8).is_bytes());
    }

    #[test]
    fn test_slice_model_on_scalars() {
        assert!(
            FieldType::slice(FieldType::Scalar(ScalarKind::String))
                .slice_model()
                .is_none()
        );
        assert!(FieldType::Scalar(ScalarKind::String).slice_model().is_none());
    }

    #[test]
    fn test_relation_kind() {
        assert_eq!(RelationKind::HasMany.display_name(), "has many");
        assert_eq!(RelationKind::ManyToMany.to_string(), "many to many");
    }

    #[test]
    fn test_database_type_from_str() {
        assert_eq!(
            "postgres".parse::<DatabaseType>(),
            Ok(DatabaseType::PostgreSQL)
        );
        assert_eq!("MySQL".parse::<DatabaseType>(), Ok(DatabaseType::MySQL));
        assert_eq!("sqlite3".parse::<DatabaseType>(), Ok(DatabaseType::SQLite));
        assert!("oracle".parse::<DatabaseType>().is_err());
    }

    #[test]
    fn test_database_type_display() {
        assert_eq!(DatabaseType::PostgreSQL.to_string(), "PostgreSQL");
    }
}
