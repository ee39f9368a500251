//! PostgreSQL to logical type conversion.

use crate::models::LogicalType;

/// Maps an `information_schema.columns` type to a [`LogicalType`].
///
/// # Arguments
/// * `data_type` - `data_type` column (e.g. `character varying`, `ARRAY`)
/// * `udt_name` - `udt_name` column (e.g. `varchar`, `_int4`, an enum name)
pub fn map_postgresql_type(data_type: &str, udt_name: &str) -> LogicalType {
    match data_type.to_lowercase().as_str() {
        "character varying" | "varchar" | "character" | "char" | "text" | "name"
        | "citext" => LogicalType::String,

        "smallint" | "int2" | "integer" | "int" | "int4" | "bigint" | "int8" => {
            LogicalType::Integer
        }

        "real" | "float4" | "double precision" | "float8" => LogicalType::Float,
        "numeric" | "decimal" | "money" => LogicalType::Decimal,

        "boolean" | "bool" => LogicalType::Boolean,

        "timestamp without time zone"
        | "timestamp"
        | "timestamp with time zone"
        | "timestamptz" => LogicalType::DateTime,
        "date" => LogicalType::Date,
        "time without time zone" | "time" | "time with time zone" | "timetz" => {
            LogicalType::Time
        }

        "bytea" => LogicalType::Binary,
        "json" | "jsonb" => LogicalType::Json,
        "uuid" => LogicalType::Uuid,

        // udt_name of an array type is the element type prefixed with '_'
        "array" => LogicalType::Custom {
            type_name: format!("{}[]", udt_name.trim_start_matches('_')),
        },

        "user-defined" => match udt_name {
            "uuid" => LogicalType::Uuid,
            "json" | "jsonb" => LogicalType::Json,
            "citext" => LogicalType::String,
            _ => LogicalType::Custom {
                type_name: udt_name.to_string(),
            },
        },

        _ => {
            tracing::debug!(
                "Unmapped PostgreSQL data type '{}' (UDT: '{}'), keeping it verbatim",
                data_type,
                udt_name
            );
            let type_name = if udt_name.is_empty() {
                data_type.to_string()
            } else {
                udt_name.to_string()
            };
            LogicalType::Custom { type_name }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types() {
        assert_eq!(map_postgresql_type("integer", "int4"), LogicalType::Integer);
        assert_eq!(map_postgresql_type("bigint", "int8"), LogicalType::Integer);
        assert_eq!(
            map_postgresql_type("character varying", "varchar"),
            LogicalType::String
        );
        assert_eq!(map_postgresql_type("numeric", "numeric"), LogicalType::Decimal);
        assert_eq!(
            map_postgresql_type("double precision", "float8"),
            LogicalType::Float
        );
        assert_eq!(
            map_postgresql_type("timestamp with time zone", "timestamptz"),
            LogicalType::DateTime
        );
        assert_eq!(map_postgresql_type("jsonb", "jsonb"), LogicalType::Json);
        assert_eq!(map_postgresql_type("bytea", "bytea"), LogicalType::Binary);
    }

    #[test]
    fn test_array_and_user_defined_types() {
        assert_eq!(map_postgresql_type("ARRAY", "_int4").name(), "int4[]");
        assert_eq!(
            map_postgresql_type("USER-DEFINED", "Estado_Planta").name(),
            "estado_planta"
        );
        assert_eq!(map_postgresql_type("inet", "inet").name(), "inet");
    }
}
