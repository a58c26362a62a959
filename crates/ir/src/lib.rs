//! # ormeta IR
//!
//! The metadata engine: derives table names, columns, primary keys and
//! relationships from model declarations and caches the result.
//!
//! ## Core Concepts
//!
//! - **Tags**: `;`-separated `KEY:VALUE` annotations on a field
//!   (e.g. `"column:email_address;not null"`)
//! - **Naming**: snake_case columns, pluralized snake_case table names
//! - **Descriptors**: `ModelDescriptor` / `FieldDescriptor` /
//!   `RelationshipDescriptor`, the derived metadata
//! - **Registry**: the memoizing, thread-safe descriptor cache
//!
//! Construction runs in two passes. The first extracts fields and primary
//! keys; the descriptor is then cached tentatively so that types referring
//! back to it resolve; the second pass infers relationships.
//!

// Module declarations
pub mod config;
pub mod descriptor;
mod extract;
pub mod naming;
pub mod registry;
pub mod relationship;
pub mod tags;

// Re-export commonly used types at crate root
pub use config::RegistryConfig;
pub use descriptor::{
    FieldDescriptor, JoinColumn, JoinTableSpec, ModelDescriptor, RelationshipDescriptor,
};
pub use naming::{TableNameHook, column_name, join_identifier, pluralize, table_name, to_db_name};
pub use registry::{Registry, RegistryBuilder};
pub use tags::TagSettings;

// Re-export core types that are commonly used with the engine
pub use ormeta_core::{
    ConfigIssue, DatabaseType, EngineError, EngineResult, FieldDef, FieldKind, FieldType, Model,
    ModelRef, ModelSchema, RelationKind, ScalarKind,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        ConfigIssue,
        EngineError,
        EngineResult,
        // Declarations
        FieldDef,
        // Descriptors
        FieldDescriptor,
        FieldKind,
        FieldType,
        Model,
        ModelDescriptor,
        ModelSchema,
        RelationKind,
        // Cache
        Registry,
        RegistryConfig,
        RelationshipDescriptor,
    };
}
