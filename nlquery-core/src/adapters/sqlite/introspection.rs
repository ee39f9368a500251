//! SQLite catalog introspection.
//!
//! - `sqlite_master`: user tables, internal `sqlite_*` tables excluded
//! - `PRAGMA table_info()`: columns in declaration (`cid`) order

use super::type_mapping::map_sqlite_type;
use crate::{
    Result,
    error::NlQueryError,
    models::{ColumnDescriptor, SchemaDescription, TableDescriptor},
};
use sqlx::{Row, SqlitePool};

pub(crate) async fn describe_schema(pool: &SqlitePool) -> Result<SchemaDescription> {
    let table_names: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| NlQueryError::introspection_failed("Failed to enumerate tables", e))?;

    let mut tables = Vec::with_capacity(table_names.len());
    for table_name in table_names {
        let columns = describe_columns(pool, &table_name).await?;
        tables.push(TableDescriptor::new(table_name, columns));
    }

    tracing::info!("Described {} SQLite tables", tables.len());
    Ok(SchemaDescription::new(tables))
}

async fn describe_columns(pool: &SqlitePool, table_name: &str) -> Result<Vec<ColumnDescriptor>> {
    // PRAGMA arguments cannot be bound
    let pragma = format!("PRAGMA table_info('{}')", table_name.replace('\'', "''"));

    let rows = sqlx::query(&pragma).fetch_all(pool).await.map_err(|e| {
        NlQueryError::introspection_failed(
            format!("Failed to read columns of table '{table_name}'"),
            e,
        )
    })?;

    rows.iter()
        .map(|row| {
            let name: String = row
                .try_get("name")
                .map_err(|e| NlQueryError::parse_field("name", Some(table_name), e))?;
            let declared_type: String = row
                .try_get::<Option<String>, _>("type")
                .map_err(|e| NlQueryError::parse_field("type", Some(table_name), e))?
                .unwrap_or_default();
            Ok(ColumnDescriptor::new(
                name,
                map_sqlite_type(&declared_type).name(),
            ))
        })
        .collect()
}
