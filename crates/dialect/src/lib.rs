//! # ormeta dialect
//!
//! Maps descriptor fields to column types of a target database.
//!
//! Each database implements [`Dialect`]; [`dialect_for`] picks one for a
//! [`DatabaseType`]. A dialect that has no safe representation for a field
//! reports `EngineError::UnsupportedType` instead of guessing.
//!
//! ```rust,ignore
//! use ormeta_dialect::{dialect_for, table_columns};
//!
//! let users = registry.descriptor::<User>()?;
//! for column in table_columns(dialect_for(DatabaseType::PostgreSQL), &users)? {
//!     println!("{} {}", column.name, column.sql_type);
//! }
//! ```

pub mod column;
pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use column::{ColumnDefinition, ColumnSpec, DEFAULT_SIZE, column_definition, table_columns};
pub use mysql::MySql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;

use ormeta_core::{DatabaseType, EngineResult};

/// Strings longer than this are stored as unbounded text
pub const MAX_VARCHAR_SIZE: usize = 65532;

// ============================================================================
// Dialect Trait
// ============================================================================

/// Column type mapping of one database
pub trait Dialect: Send + Sync {
    /// Short name used in error messages ("postgres")
    fn name(&self) -> &'static str;

    /// The database this dialect targets
    fn database(&self) -> DatabaseType;

    /// Column type for a field, without constraints
    fn sql_type(&self, column: &ColumnSpec<'_>) -> EngineResult<String>;
}

/// The dialect of a database
pub fn dialect_for(database: DatabaseType) -> &'static dyn Dialect {
    match database {
        DatabaseType::PostgreSQL => &Postgres,
        DatabaseType::MySQL => &MySql,
        DatabaseType::SQLite => &Sqlite,
    }
}

/// Check if a declared size fits a bounded string column
pub(crate) fn is_bounded(size: usize) -> bool {
    size > 0 && size < MAX_VARCHAR_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_for() {
        for database in [DatabaseType::PostgreSQL, DatabaseType::MySQL, DatabaseType::SQLite] {
            assert_eq!(dialect_for(database).database(), database);
        }
        assert_eq!(dialect_for(DatabaseType::PostgreSQL).name(), "postgres");
    }

    #[test]
    fn test_is_bounded() {
        assert!(is_bounded(1));
        assert!(is_bounded(65531));
        assert!(!is_bounded(0));
        assert!(!is_bounded(65532));
    }
}
