//! # ormeta core
//!
//! Core types, traits, and error handling for ormeta.
//!
//! This crate provides the foundational building blocks used throughout
//! the ormeta workspace, including:
//!
//! - **Types**: the field type model (`FieldType`, `ScalarKind`), relationship
//!   kinds and target databases
//! - **Schema**: the declaration builder (`ModelSchema`, `FieldDef`) a model
//!   type hands to the metadata engine
//! - **Traits**: `Model` and `FieldKind`, implemented by hand or through
//!   `#[derive(Model)]`
//! - **Errors**: unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod schema;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{ConfigIssue, EngineError, EngineResult};
pub use schema::{FieldDef, ModelRef, ModelSchema};
pub use traits::{FieldKind, Hstore, Model};
pub use types::{DatabaseType, FieldType, RelationKind, ScalarKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
