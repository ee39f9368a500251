//! Decoding of PostgreSQL result rows.
//!
//! Values are decoded by the column's wire type name. Types without a
//! dedicated mapping fall back to their text form, or NULL when the driver
//! cannot produce one.

use crate::{
    Result,
    adapters::helpers::{blob_value, or_null},
    error::NlQueryError,
    models::{QueryResultRow, ScalarValue},
};
use sqlx::{Column, Row, TypeInfo, postgres::PgRow};

pub(crate) fn decode_row(row: &PgRow) -> Result<QueryResultRow> {
    let mut result = QueryResultRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_value(row, index, column.type_info().name())?;
        result.insert(column.name(), value);
    }
    Ok(result)
}

fn get<'r, T>(row: &'r PgRow, index: usize) -> Result<Option<T>>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(index)
        .map_err(|e| NlQueryError::query_failed(format!("Failed to decode column {index}"), e))
}

fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Result<ScalarValue> {
    let value = match type_name {
        "BOOL" => or_null(get::<bool>(row, index)?, ScalarValue::Boolean),
        "INT2" => or_null(get::<i16>(row, index)?, |v| ScalarValue::Integer(i64::from(v))),
        "INT4" => or_null(get::<i32>(row, index)?, |v| ScalarValue::Integer(i64::from(v))),
        "INT8" => or_null(get::<i64>(row, index)?, ScalarValue::Integer),
        "OID" => or_null(get::<sqlx::postgres::types::Oid>(row, index)?, |v| {
            ScalarValue::Integer(i64::from(v.0))
        }),
        "FLOAT4" => or_null(get::<f32>(row, index)?, |v| ScalarValue::Float(f64::from(v))),
        "FLOAT8" => or_null(get::<f64>(row, index)?, ScalarValue::Float),
        "NUMERIC" => or_null(get::<sqlx::types::Decimal>(row, index)?, |v| {
            let text = v.to_string();
            text.parse::<f64>()
                .map_or(ScalarValue::Text(text), ScalarValue::Float)
        }),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CITEXT" => {
            or_null(get::<String>(row, index)?, ScalarValue::Text)
        }
        "DATE" => or_null(get::<chrono::NaiveDate>(row, index)?, ScalarValue::Date),
        "TIMESTAMP" => or_null(
            get::<chrono::NaiveDateTime>(row, index)?,
            ScalarValue::Timestamp,
        ),
        "TIMESTAMPTZ" => or_null(
            get::<chrono::DateTime<chrono::Utc>>(row, index)?,
            |v| ScalarValue::Timestamp(v.naive_utc()),
        ),
        "TIME" => or_null(get::<chrono::NaiveTime>(row, index)?, |v| {
            ScalarValue::Text(v.to_string())
        }),
        "UUID" => or_null(get::<uuid::Uuid>(row, index)?, |v| {
            ScalarValue::Text(v.to_string())
        }),
        "JSON" | "JSONB" => or_null(get::<serde_json::Value>(row, index)?, |v| {
            ScalarValue::Text(v.to_string())
        }),
        "BYTEA" => or_null(get::<Vec<u8>>(row, index)?, |v| blob_value(&v)),
        // Enums and other text-like custom types
        _ => match row.try_get_unchecked::<Option<String>, _>(index) {
            Ok(v) => or_null(v, ScalarValue::Text),
            Err(e) => {
                tracing::debug!(
                    "No text form for PostgreSQL type {} in column {}: {}",
                    type_name,
                    index,
                    e
                );
                ScalarValue::Null
            }
        },
    };
    Ok(value)
}
