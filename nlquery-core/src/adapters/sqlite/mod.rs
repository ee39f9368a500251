//! SQLite database adapter.
//!
//! # Module Structure
//! - `connection`: Connection handling and connection string parsing
//! - `type_mapping`: SQLite to logical type conversion
//! - `introspection`: Table and column listing via `sqlite_master` and PRAGMA
//! - `rows`: Decoding of dynamically typed result rows
//!
//! # SQLite-Specific Features
//! - Supports both file-based and in-memory databases
//! - Values are decoded from their storage class, not the declared type

pub mod connection;
mod introspection;
mod rows;
pub mod type_mapping;


use super::{ConnectionConfig, DatabaseAdapter, QueryRunner, SchemaProvider};
use crate::{
    Result,
    error::NlQueryError,
    models::{DatabaseType, QueryResult, SchemaDescription},
};
use async_trait::async_trait;
use sqlx::SqlitePool;

pub use type_mapping::map_sqlite_type;

/// SQLite database adapter.
pub struct SqliteAdapter {
    /// Connection pool (a single connection for in-memory databases)
    pub pool: SqlitePool,
    /// Connection configuration
    pub config: ConnectionConfig,
    /// Original connection string
    pub connection_string: String,
}

impl std::fmt::Debug for SqliteAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteAdapter")
            .field("config", &self.config)
            .field("is_in_memory", &self.is_in_memory())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SchemaProvider for SqliteAdapter {
    async fn describe_schema(&self) -> Result<SchemaDescription> {
        introspection::describe_schema(&self.pool).await
    }
}

#[async_trait]
impl QueryRunner for SqliteAdapter {
    async fn fetch_rows(&self, sql: &str) -> Result<QueryResult> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| NlQueryError::query_failed("SQLite statement failed", e))?;

        Ok(rows.iter().map(rows::decode_row).collect())
    }
}

#[async_trait]
impl DatabaseAdapter for SqliteAdapter {
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

        let _: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| NlQueryError::introspection_failed("Cannot access sqlite_master", e))?;

        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::SQLite
    }

    fn connection_config(&self) -> ConnectionConfig {
        self.config.clone()
    }
}
