//! SQLite to logical type conversion.
//!
//! SQLite determines type affinity from declared type names:
//! 1. Contains "INT" -> INTEGER affinity
//! 2. Contains "CHAR", "CLOB", or "TEXT" -> TEXT affinity
//! 3. Contains "BLOB" or no type specified -> BLOB affinity
//! 4. Contains "REAL", "FLOA", or "DOUB" -> REAL affinity
//! 5. Otherwise -> NUMERIC affinity
//!
//! Well-known names with NUMERIC affinity (`BOOLEAN`, `DATE`, ...) are
//! recognized before rule 5 so the model sees what the column holds.

use crate::adapters::helpers::base_type_name;
use crate::models::LogicalType;

/// Maps a declared SQLite column type to a [`LogicalType`].
///
/// # Example
/// ```rust
/// use nlquery_core::adapters::sqlite::map_sqlite_type;
/// use nlquery_core::models::LogicalType;
///
/// assert_eq!(map_sqlite_type("VARCHAR(255)"), LogicalType::String);
/// assert_eq!(map_sqlite_type("integer"), LogicalType::Integer);
/// ```
pub fn map_sqlite_type(sqlite_type: &str) -> LogicalType {
    let base_type = base_type_name(sqlite_type);

    if base_type.is_empty() {
        return LogicalType::Binary;
    }

    if base_type.contains("INT") {
        return LogicalType::Integer;
    }

    if base_type.contains("CHAR") || base_type.contains("CLOB") || base_type.contains("TEXT") {
        return LogicalType::String;
    }

    if base_type.contains("BLOB") {
        return LogicalType::Binary;
    }

    if base_type.contains("REAL") || base_type.contains("FLOA") || base_type.contains("DOUB") {
        return LogicalType::Float;
    }

    match base_type.as_str() {
        "BOOLEAN" | "BOOL" => LogicalType::Boolean,
        "DATE" => LogicalType::Date,
        "TIME" => LogicalType::Time,
        "DATETIME" | "TIMESTAMP" => LogicalType::DateTime,
        "NUMERIC" | "DECIMAL" | "NUMBER" => LogicalType::Decimal,
        "JSON" | "JSONB" => LogicalType::Json,
        "UUID" | "GUID" => LogicalType::Uuid,
        "BINARY" | "VARBINARY" => LogicalType::Binary,
        "STRING" => LogicalType::String,
        _ if base_type.contains("NUM") || base_type.contains("DEC") => LogicalType::Decimal,
        _ => LogicalType::Custom {
            type_name: sqlite_type.trim().to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_rules() {
        assert_eq!(map_sqlite_type("INTEGER"), LogicalType::Integer);
        assert_eq!(map_sqlite_type("unsigned big int"), LogicalType::Integer);
        assert_eq!(map_sqlite_type("NVARCHAR(100)"), LogicalType::String);
        assert_eq!(map_sqlite_type("CLOB"), LogicalType::String);
        assert_eq!(map_sqlite_type("BLOB"), LogicalType::Binary);
        assert_eq!(map_sqlite_type(""), LogicalType::Binary);
        assert_eq!(map_sqlite_type("DOUBLE PRECISION"), LogicalType::Float);
        assert_eq!(map_sqlite_type("REAL"), LogicalType::Float);
    }

    #[test]
    fn test_named_numeric_affinity_types() {
        assert_eq!(map_sqlite_type("BOOLEAN"), LogicalType::Boolean);
        assert_eq!(map_sqlite_type("date"), LogicalType::Date);
        assert_eq!(map_sqlite_type("DATETIME"), LogicalType::DateTime);
        assert_eq!(map_sqlite_type("DECIMAL(10,2)"), LogicalType::Decimal);
        assert_eq!(map_sqlite_type("uuid"), LogicalType::Uuid);
    }

    #[test]
    fn test_unknown_type_kept_verbatim() {
        let mapped = map_sqlite_type("Geometry");
        assert_eq!(
            mapped,
            LogicalType::Custom {
                type_name: "Geometry".to_string()
            }
        );
        assert_eq!(mapped.name(), "geometry");
    }
}
