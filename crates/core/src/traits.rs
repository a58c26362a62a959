//! Core traits for ormeta
//!
//! This module defines the two traits a model declaration is built from:
//! `Model`, implemented by every persisted type, and `FieldKind`, which maps
//! a Rust field type onto the engine's `FieldType`.

use crate::schema::ModelSchema;
use crate::types::{FieldType, ScalarKind};
use std::collections::{BTreeMap, HashMap};
use std::ops::{Deref, DerefMut};

// ============================================================================
// Model Trait
// ============================================================================

/// Trait for types that persist to a relational table
///
/// Usually derived:
///
/// ```rust,ignore
/// use ormeta::Model;
///
/// #[derive(Model)]
/// pub struct User {
///     pub id: u32,
///     #[sql("not null;unique")]
///     pub email: String,
///     pub posts: Vec<Post>,
/// }
/// ```
///
/// or written against the builder:
///
/// ```rust,ignore
/// impl Model for User {
///     fn schema() -> ModelSchema {
///         ModelSchema::new("User")
///             .field(FieldDef::of::<u32>("ID"))
///             .field(FieldDef::of::<String>("Email").sql("not null;unique"))
///             .field(FieldDef::of::<Vec<Post>>("Posts"))
///     }
/// }
/// ```
pub trait Model: 'static {
    /// The declared shape of this type
    fn schema() -> ModelSchema;
}

// ============================================================================
// FieldKind Trait
// ============================================================================

/// Trait for Rust types that can appear as model fields
///
/// `#[derive(Model)]` implements it for the model itself, so models can be
/// held by other models' fields. Hand-written models implement it with
/// `FieldType::model::<Self>()`.
///
/// Types with a custom storage representation (the "scanner" capability)
/// report it through `FieldType::scanner`:
///
/// ```rust,ignore
/// impl FieldKind for Email {
///     fn field_type() -> FieldType {
///         FieldType::scanner(FieldType::Scalar(ScalarKind::String))
///     }
/// }
/// ```
pub trait FieldKind {
    /// The engine-level type of this Rust type
    fn field_type() -> FieldType;
}

macro_rules! scalar_field_kind {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldKind for $ty {
                fn field_type() -> FieldType {
                    FieldType::Scalar(ScalarKind::$kind)
                }
            }
        )*
    };
}

scalar_field_kind! {
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

impl<T: FieldKind> FieldKind for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: FieldKind> FieldKind for Box<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T: FieldKind> FieldKind for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::slice(T::field_type())
    }
}

impl<T: FieldKind, const N: usize> FieldKind for [T; N] {
    fn field_type() -> FieldType {
        FieldType::Array {
            elem: Box::new(T::field_type()),
            len: N,
        }
    }
}

impl<K: FieldKind, V: FieldKind, S> FieldKind for HashMap<K, V, S> {
    fn field_type() -> FieldType {
        FieldType::Map {
            key: Box::new(K::field_type()),
            value: Box::new(V::field_type()),
        }
    }
}

impl<K: FieldKind, V: FieldKind> FieldKind for BTreeMap<K, V> {
    fn field_type() -> FieldType {
        FieldType::Map {
            key: Box::new(K::field_type()),
            value: Box::new(V::field_type()),
        }
    }
}

impl<Tz: chrono::TimeZone> FieldKind for chrono::DateTime<Tz> {
    fn field_type() -> FieldType {
        FieldType::Time
    }
}

impl FieldKind for chrono::NaiveDateTime {
    fn field_type() -> FieldType {
        FieldType::Time
    }
}

impl FieldKind for uuid::Uuid {
    fn field_type() -> FieldType {
        FieldType::Uuid
    }
}

// ============================================================================
// Hstore
// ============================================================================

/// A PostgreSQL `hstore` column: string keys to nullable string values
///
/// Stored through its own representation, so it is seen as a scanner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hstore(pub HashMap<String, Option<String>>);

impl Hstore {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for Hstore {
    type Target = HashMap<String, Option<String>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Hstore {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FieldKind for Hstore {
    fn field_type() -> FieldType {
        FieldType::scanner(FieldType::Hstore)
    }
}

// ============================================================================
// Tests
// ============================================================================
