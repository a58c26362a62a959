//! SQLite column types

use crate::{ColumnSpec, Dialect, is_bounded};
use ormeta_core::{DatabaseType, EngineError, EngineResult, FieldType, ScalarKind};

const AUTO_INCREMENT_KEY: &str = "integer primary key autoincrement";

/// SQLite dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl Dialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn database(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn sql_type(&self, column: &ColumnSpec<'_>) -> EngineResult<String> {
        let sql_type = match column.field_type {
            FieldType::Scalar(ScalarKind::Bool) => "bool".to_string(),
            FieldType::Scalar(kind) if kind.is_narrow_integer() => {
                (if column.auto_increment { AUTO_INCREMENT_KEY } else { "integer" }).to_string()
            }
            FieldType::Scalar(kind) if kind.is_wide_integer() => {
                (if column.auto_increment { AUTO_INCREMENT_KEY } else { "bigint" }).to_string()
            }
            FieldType::Scalar(kind) if kind.is_float() => "real".to_string(),
            FieldType::Scalar(ScalarKind::String) => {
                if is_bounded(column.size) {
                    format!("varchar({})", column.size)
                } else {
                    "text".to_string()
                }
            }
            FieldType::Time => "datetime".to_string(),
            FieldType::Uuid => "uuid".to_string(),
            other if other.is_bytes() => "blob".to_string(),
            other => {
                return Err(EngineError::unsupported_type(
                    self.name(),
                    column.field_name,
                    other,
                ));
            }
        };
        Ok(sql_type)
    }
}
