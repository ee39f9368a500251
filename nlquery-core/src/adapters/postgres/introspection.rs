//! PostgreSQL catalog introspection.
//!
//! Lists the base tables visible on the session search path together with
//! their columns in `ordinal_position` order.

use super::type_mapping::map_postgresql_type;
use crate::{
    Result,
    adapters::helpers::RowExt,
    error::NlQueryError,
    models::{ColumnDescriptor, SchemaDescription, TableDescriptor},
};
use sqlx::PgPool;
use std::collections::HashMap;

const TABLES_QUERY: &str = r"
    SELECT table_name::text AS table_name
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
      AND table_schema = ANY(current_schemas(false))
    ORDER BY table_name
";

const COLUMNS_QUERY: &str = r"
    SELECT c.table_name::text AS table_name,
           c.column_name::text AS column_name,
           c.data_type::text AS data_type,
           c.udt_name::text AS udt_name
    FROM information_schema.columns c
    JOIN information_schema.tables t
      ON t.table_schema = c.table_schema AND t.table_name = c.table_name
    WHERE t.table_type = 'BASE TABLE'
      AND c.table_schema = ANY(current_schemas(false))
    ORDER BY c.table_name, c.ordinal_position
";

pub(crate) async fn describe_schema(pool: &PgPool) -> Result<SchemaDescription> {
    tracing::debug!("Enumerating PostgreSQL tables");

    let table_rows = sqlx::query(TABLES_QUERY)
        .fetch_all(pool)
        .await
        .map_err(|e| NlQueryError::introspection_failed("Failed to enumerate tables", e))?;

    let column_rows = sqlx::query(COLUMNS_QUERY)
        .fetch_all(pool)
        .await
        .map_err(|e| NlQueryError::introspection_failed("Failed to enumerate columns", e))?;

    let mut columns_by_table: HashMap<String, Vec<ColumnDescriptor>> = HashMap::new();
    for row in &column_rows {
        let table_name: String = row.get_field("table_name", None)?;
        let column_name: String = row.get_field("column_name", Some(&table_name))?;
        let data_type: String = row.get_field("data_type", Some(&table_name))?;
        let udt_name: String = row.get_field("udt_name", Some(&table_name))?;

        columns_by_table
            .entry(table_name)
            .or_default()
            .push(ColumnDescriptor::new(
                column_name,
                map_postgresql_type(&data_type, &udt_name).name(),
            ));
    }

    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        let table_name: String = row.get_field("table_name", None)?;
        let columns = columns_by_table.remove(&table_name).unwrap_or_default();
        tables.push(TableDescriptor::new(table_name, columns));
    }

    tracing::info!("Described {} PostgreSQL tables", tables.len());
    Ok(SchemaDescription::new(tables))
}
