//! PostgreSQL column types

use crate::{ColumnSpec, Dialect, is_bounded};
use ormeta_core::{DatabaseType, EngineError, EngineResult, FieldType, ScalarKind};

/// PostgreSQL dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn database(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
    }

    fn sql_type(&self, column: &ColumnSpec<'_>) -> EngineResult<String> {
        let sql_type = match column.field_type {
            FieldType::Scalar(ScalarKind::Bool) => "boolean".to_string(),
            FieldType::Scalar(kind) if kind.is_narrow_integer() => {
                (if column.auto_increment { "serial" } else { "integer" }).to_string()
            }
            FieldType::Scalar(kind) if kind.is_wide_integer() => {
                (if column.auto_increment { "bigserial" } else { "bigint" }).to_string()
            }
            FieldType::Scalar(kind) if kind.is_float() => "numeric".to_string(),
            FieldType::Scalar(ScalarKind::String) => {
                if is_bounded(column.size) {
                    format!("varchar({})", column.size)
                } else {
                    "text".to_string()
                }
            }
            FieldType::Time => "timestamp with time zone".to_string(),
            FieldType::Hstore => "hstore".to_string(),
            FieldType::Uuid => "uuid".to_string(),
            other if other.is_bytes() => "bytea".to_string(),
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

    fn map(field_type: FieldType) -> EngineResult<String> {
        Postgres.sql_type(&ColumnSpec::new("Field", &field_type))
    }

    fn scalar(kind: ScalarKind) -> FieldType {
        FieldType::Scalar(kind)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(map(scalar(ScalarKind::Bool)).unwrap(), "boolean");
        assert_eq!(map(scalar(ScalarKind::Int16)).unwrap(), "integer");
        assert_eq!(map(scalar(ScalarKind::Uint32)).unwrap(), "integer");
        assert_eq!(map(scalar(ScalarKind::Int64)).unwrap(), "bigint");
        assert_eq!(map(scalar(ScalarKind::Float32)).unwrap(), "numeric");
        assert_eq!(map(scalar(ScalarKind::String)).unwrap(), "varchar(255)");
    }

    #[test]
    fn test_auto_increment() {
        let int = scalar(ScalarKind::Uint);
        let wide = scalar(ScalarKind::Uint64);
        let int_key = ColumnSpec::new("ID", &int).with_auto_increment(true);
        let wide_key = ColumnSpec::new("ID", &wide).with_auto_increment(true);
        assert_eq!(Postgres.sql_type(&int_key).unwrap(), "serial");
        assert_eq!(Postgres.sql_type(&wide_key).unwrap(), "bigserial");
    }

    #[test]
    fn test_string_sizes() {
        let string = scalar(ScalarKind::String);
        let sized = |size| ColumnSpec::new("Name", &string).with_size(size);
        assert_eq!(Postgres.sql_type(&sized(64)).unwrap(), "varchar(64)");
        assert_eq!(Postgres.sql_type(&sized(65531)).unwrap(), "varchar(65531)");
        assert_eq!(Postgres.sql_type(&sized(65532)).unwrap(), "text");
        assert_eq!(Postgres.sql_type(&sized(0)).unwrap(), "text");
    }

    #[test]
    fn test_structured_types() {
        assert_eq!(map(FieldType::Time).unwrap(), "timestamp with time zone");
        assert_eq!(map(FieldType::Hstore).unwrap(), "hstore");
        assert_eq!(map(FieldType::Uuid).unwrap(), "uuid");
        assert_eq!(
            map(FieldType::slice(scalar(ScalarKind::Uint8))).unwrap(),
            "bytea"
        );
        assert_eq!(
            map(FieldType::scanner(FieldType::Uuid)).unwrap(),
            "uuid"
        );
    }

    #[test]
    fn test_unsupported() {
        let err = map(FieldType::slice(scalar(ScalarKind::String))).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "Unsupported type Vec<String> for field 'Field' in postgres"
        );
    }
}
