//! Live schema description for the SQL generator.

use crate::{
    Result,
    adapters::SchemaProvider,
    models::{SchemaDescription, TableDescriptor},
};
use std::sync::Arc;

/// Reads the catalog through a [`SchemaProvider`] and applies the key
/// naming convention the generator prompt relies on: the first column of
/// every table is presented as `<table><column>` (e.g. `Id` of `Planta`
/// becomes `PlantaId`).
///
/// Nothing is cached; each call reads the catalog again.
#[derive(Clone)]
pub struct SchemaIntrospector {
    provider: Arc<dyn SchemaProvider>,
}

impl std::fmt::Debug for SchemaIntrospector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaIntrospector").finish_non_exhaustive()
    }
}

impl SchemaIntrospector {
    /// Creates an introspector over a catalog source.
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self { provider }
    }

    /// Describes every table with its columns.
    ///
    /// # Errors
    /// Propagates the provider's connection or introspection failure
    pub async fn describe_schema(&self) -> Result<SchemaDescription> {
        let start = std::time::Instant::now();
        let catalog = self.provider.describe_schema().await?;
        let description = apply_key_naming(catalog);

        tracing::info!(
            "Schema described: {} tables in {:.2}s",
            description.tables.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(description)
    }
}

/// Renames the first column of each table to `<table><column>`.
pub fn apply_key_naming(catalog: SchemaDescription) -> SchemaDescription {
    let tables = catalog
        .tables
        .into_iter()
        .map(|mut table: TableDescriptor| {
            if let Some(first) = table.columns.first_mut() {
                first.column_name = format!("{}{}", table.table_name, first.column_name);
            }
            table
        })
        .collect();
    SchemaDescription::new(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::NlQueryError,
        models::{ColumnDescriptor, TableDescriptor},
    };
    use async_trait::async_trait;

    struct StaticCatalog(SchemaDescription);

    #[async_trait]
    impl SchemaProvider for StaticCatalog {
        async fn describe_schema(&self) -> Result<SchemaDescription> {
            Ok(self.0.clone())
        }
    }

    struct UnreachableCatalog;

    #[async_trait]
    impl SchemaProvider for UnreachableCatalog {
        async fn describe_schema(&self) -> Result<SchemaDescription> {
            Err(NlQueryError::introspection_failed(
                "catalog offline",
                std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
            ))
        }
    }

    fn plants_catalog() -> SchemaDescription {
        SchemaDescription::new(vec![
            TableDescriptor::new(
                "Planta",
                vec![
                    ColumnDescriptor::new("Id", "int"),
                    ColumnDescriptor::new("Nombre", "string"),
                ],
            ),
            TableDescriptor::new("Vacia", Vec::new()),
        ])
    }

    #[tokio::test]
    async fn test_first_column_is_prefixed_with_table_name() {
        let introspector = SchemaIntrospector::new(Arc::new(StaticCatalog(plants_catalog())));
        let schema = introspector.describe_schema().await.unwrap();

        let planta = schema.table("Planta").unwrap();
        assert_eq!(planta.columns[0].column_name, "PlantaId");
        assert_eq!(planta.columns[0].column_type, "int");
        assert_eq!(planta.columns[1].column_name, "Nombre");
    }

    #[tokio::test]
    async fn test_table_without_columns_is_kept() {
        let introspector = SchemaIntrospector::new(Arc::new(StaticCatalog(plants_catalog())));
        let schema = introspector.describe_schema().await.unwrap();
        assert!(schema.table("Vacia").unwrap().columns.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let introspector = SchemaIntrospector::new(Arc::new(UnreachableCatalog));
        let result = introspector.describe_schema().await;
        assert!(matches!(result, Err(NlQueryError::Introspection { .. })));
    }
}
