//! Helper utilities shared by the database adapters.

use crate::models::ScalarValue;

#[cfg(feature = "postgresql")]
use crate::{Result, error::NlQueryError};
#[cfg(feature = "postgresql")]
use sqlx::{Row, postgres::PgRow};

/// Extension trait for extracting typed catalog values from rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use nlquery_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("column_name", Some("Planta"))?;
/// ```
#[cfg(feature = "postgresql")]
pub trait RowExt {
    /// Extracts a typed field from the row with proper error context.
    ///
    /// # Errors
    /// Returns an introspection error naming the field and table
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>;
}

#[cfg(feature = "postgresql")]
impl RowExt for PgRow {
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> Result<T>
    where
        T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
    {
        self.try_get(field_name)
            .map_err(|e| NlQueryError::parse_field(field_name, table_context, e))
    }
}

/// Renders binary data as `base64:<payload>` text.
pub fn blob_value(bytes: &[u8]) -> ScalarValue {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    ScalarValue::Text(format!("base64:{encoded}"))
}

/// Maps an optional decoded value, turning `None` into SQL NULL.
pub fn or_null<T>(value: Option<T>, wrap: impl FnOnce(T) -> ScalarValue) -> ScalarValue {
    value.map_or(ScalarValue::Null, wrap)
}

/// Strips a parenthesized length or precision suffix, e.g. `VARCHAR(255)`.
pub fn base_type_name(type_name: &str) -> String {
    let upper = type_name.trim().to_uppercase();
    upper
        .split_once('(')
        .map_or(upper.as_str(), |(base, _)| base)
        .trim()
        .to_string()
}
