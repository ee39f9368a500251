//! Decoding of SQLite result rows.

use crate::{
    adapters::helpers::{blob_value, or_null},
    models::{QueryResultRow, ScalarValue},
};
use sqlx::{Column, Row, TypeInfo, sqlite::SqliteRow};

pub(crate) fn decode_row(row: &SqliteRow) -> QueryResultRow {
    let mut result = QueryResultRow::new();
    for (index, column) in row.columns().iter().enumerate() {
        let declared_bool = column.type_info().name() == "BOOLEAN";
        result.insert(column.name(), decode_value(row, index, declared_bool));
    }
    result
}

/// SQLite is dynamically typed, so each storage class is tried in turn.
fn decode_value(row: &SqliteRow, index: usize, declared_bool: bool) -> ScalarValue {
    if declared_bool && let Ok(v) = row.try_get::<Option<bool>, _>(index) {
        return or_null(v, ScalarValue::Boolean);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(index) {
        return or_null(v, ScalarValue::Text);
    }
    if let Ok(v) = row.try_get::<Option<i64>, _>(index) {
        return or_null(v, ScalarValue::Integer);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(index) {
        return or_null(v, ScalarValue::Float);
    }
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return or_null(v, |bytes| blob_value(&bytes));
    }
    ScalarValue::Null
}
