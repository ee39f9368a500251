//! PostgreSQL database adapter with connection pooling.
//!
//! # Module Structure
//! - `connection`: Connection pool management and validation
//! - `type_mapping`: PostgreSQL to logical type conversion
//! - `introspection`: Table and column listing from `information_schema`
//! - `rows`: Decoding of arbitrary result rows into scalar values
//!
//! # Security Guarantees
//! - Connection strings are sanitized in error messages
//! - Every session carries a statement timeout
//! - Sessions can be opened read-only on request

mod connection;
mod introspection;
mod rows;
mod type_mapping;

#[cfg(test)]
mod tests;

use super::{ConnectionConfig, DatabaseAdapter, QueryRunner, SchemaProvider};
use crate::{
    Result,
    error::NlQueryError,
    models::{DatabaseType, QueryResult, SchemaDescription},
};
use async_trait::async_trait;
use sqlx::PgPool;

pub use type_mapping::map_postgresql_type;

/// PostgreSQL database adapter with connection pooling
pub struct PostgresAdapter {
    pub pool: PgPool,
    pub config: ConnectionConfig,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("config", &self.config)
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish()
    }
}

#[async_trait]
impl SchemaProvider for PostgresAdapter {
    async fn describe_schema(&self) -> Result<SchemaDescription> {
        introspection::describe_schema(&self.pool).await
    }
}

#[async_trait]
impl QueryRunner for PostgresAdapter {
    async fn fetch_rows(&self, sql: &str) -> Result<QueryResult> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| NlQueryError::query_failed("PostgreSQL statement failed", e))?;

        rows.iter().map(rows::decode_row).collect()
    }
}

#[async_trait]
impl DatabaseAdapter for PostgresAdapter {
    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(NlQueryError::connection_failed)?;

        if connectivity_result != 1 {
            return Err(NlQueryError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        // The introspector depends on information_schema being readable
        let _: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'information_schema'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| NlQueryError::introspection_failed("Cannot access information_schema", e))?;

        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::PostgreSQL
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
