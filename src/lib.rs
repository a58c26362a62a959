//! # ormeta
//!
//! Object-relational metadata engine. Given a model declaration, ormeta
//! derives the table name, column mapping, primary keys and relationships
//! (has-one, has-many, belongs-to, many-to-many, polymorphic) a persistence
//! layer needs, and maps columns to PostgreSQL, MySQL or SQLite types.
//!
//! ```rust,ignore
//! use ormeta::prelude::*;
//!
//! #[derive(Model)]
//! pub struct Owner {
//!     pub id: u32,
//!     pub children: Vec<Child>,
//! }
//!
//! #[derive(Model)]
//! pub struct Child {
//!     pub id: u32,
//!     pub owner_id: u32,
//! }
//!
//! let owner = Registry::global().descriptor::<Owner>()?;
//! let rel = owner.relationship("children").unwrap();
//! assert_eq!(rel.kind, RelationKind::HasMany);
//! assert_eq!(rel.foreign_db_names, ["owner_id"]);
//! ```
//!
//! The workspace crates:
//!
//! - `ormeta_core`: field types, declarations, traits and errors
//! - `ormeta_ir`: tags, naming, descriptors and the registry
//! - `ormeta_dialect`: column type mapping
//! - `ormeta_derive`: `#[derive(Model)]`
//!

// Lets `#[derive(Model)]` expand to `::ormeta::...` inside this crate too
extern crate self as ormeta;

pub mod demo;

pub use ormeta_core::{
    ConfigIssue, DatabaseType, EngineError, EngineResult, FieldDef, FieldKind, FieldType, Hstore,
    Model, ModelRef, ModelSchema, RelationKind, ScalarKind,
};
pub use ormeta_derive::Model;
pub use ormeta_dialect::{
    ColumnDefinition, ColumnSpec, Dialect, MySql, Postgres, Sqlite, column_definition,
    dialect_for, table_columns,
};
pub use ormeta_ir::{
    FieldDescriptor, JoinColumn, JoinTableSpec, ModelDescriptor, Registry, RegistryBuilder,
    RegistryConfig, RelationshipDescriptor, TableNameHook, TagSettings,
};

// Whole crates, for items not re-exported here
pub use ormeta_core as core;
pub use ormeta_dialect as dialect;
pub use ormeta_ir as ir;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for declaring and inspecting models
pub mod prelude {
    pub use crate::{
        DatabaseType,
        EngineError,
        EngineResult,
        // Declarations
        FieldDef,
        FieldDescriptor,
        FieldKind,
        FieldType,
        Model,
        // Descriptors
        ModelDescriptor,
        ModelSchema,
        RelationKind,
        // Cache
        Registry,
        RelationshipDescriptor,
        dialect_for,
        table_columns,
    };
}
