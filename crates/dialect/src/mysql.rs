//! MySQL column types

use crate::{ColumnSpec, Dialect, is_bounded};
use ormeta_core::{DatabaseType, EngineError, EngineResult, FieldType, ScalarKind};

/// MySQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn database(&self) -> DatabaseType {
        DatabaseType::MySQL
    }

    fn sql_type(&self, column: &ColumnSpec<'_>) -> EngineResult<String> {
        let sql_type = match column.field_type {
            FieldType::Scalar(ScalarKind::Bool) => "boolean".to_string(),
            FieldType::Scalar(kind) if kind.is_narrow_integer() => {
                (if column.auto_increment { "int AUTO_INCREMENT" } else { "int" }).to_string()
            }
            FieldType::Scalar(kind) if kind.is_wide_integer() => {
                (if column.auto_increment { "bigint AUTO_INCREMENT" } else { "bigint" }).to_string()
            }
            FieldType::Scalar(kind) if kind.is_float() => "double".to_string(),
            FieldType::Scalar(ScalarKind::String) => {
                if is_bounded(column.size) {
                    format!("varchar({})", column.size)
                } else {
                    "longtext".to_string()
                }
            }
            FieldType::Time => "timestamp NULL".to_string(),
            FieldType::Uuid => "varchar(36)".to_string(),
            other if other.is_bytes() => {
                if is_bounded(column.size) {
                    format!("varbinary({})", column.size)
                } else {
                    "longblob".to_string()
                }
            }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mysql_types() {
        let int = FieldType::Scalar(ScalarKind::Int32);
        let wide = FieldType::Scalar(ScalarKind::Int64);
        let text = FieldType::Scalar(ScalarKind::String);
        let bytes = FieldType::slice(FieldType::Scalar(ScalarKind::Uint8));

        assert_eq!(MySql.sql_type(&ColumnSpec::new("A", &int)).unwrap(), "int");
        assert_eq!(
            MySql
                .sql_type(&ColumnSpec::new("A", &wide).with_auto_increment(true))
                .unwrap(),
            "bigint AUTO_INCREMENT"
        );
        assert_eq!(
            MySql.sql_type(&ColumnSpec::new("A", &text).with_size(70000)).unwrap(),
            "longtext"
        );
        assert_eq!(
            MySql.sql_type(&ColumnSpec::new("A", &bytes).with_size(16)).unwrap(),
            "varbinary(16)"
        );
        assert_eq!(
            MySql.sql_type(&ColumnSpec::new("A", &FieldType::Time)).unwrap(),
            "timestamp NULL"
        );
        assert_eq!(
            MySql.sql_type(&ColumnSpec::new("A", &FieldType::Uuid)).unwrap(),
            "varchar(36)"
        );
    }

    #[test]
    fn test_hstore_unsupported() {
        let err = MySql
            .sql_type(&ColumnSpec::new("Meta", &FieldType::Hstore))
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
