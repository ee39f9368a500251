//! PostgreSQL connection pool management and validation.
//!
//! # Security Features
//! - Validates connection string format and parameters
//! - Enforces connection limits to prevent resource exhaustion
//! - Applies a statement timeout to every pooled session

use super::{ConnectionConfig, PostgresAdapter};
use crate::{
    Result,
    error::{NlQueryError, redact_database_url},
};
use sqlx::PgPool;
use std::time::Duration;
use url::Url;

impl PostgresAdapter {
    /// Creates a new PostgreSQL adapter with connection pooling.
    ///
    /// The pool connects lazily; the first query (or
    /// [`DatabaseAdapter::test_connection`](crate::adapters::DatabaseAdapter::test_connection))
    /// opens the first session.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or the pool
    /// cannot be configured
    pub fn new(connection_string: &str) -> Result<Self> {
        let config = Self::parse_connection_config(connection_string)?;
        let pool = Self::create_connection_pool(connection_string, &config)?;
        Ok(Self { pool, config })
    }

    /// Creates a new PostgreSQL adapter with custom configuration.
    ///
    /// # Errors
    /// Returns error if the configuration or connection string is invalid
    pub fn with_config(connection_string: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        Self::validate_connection_string(connection_string)?;
        let pool = Self::create_connection_pool(connection_string, &config)?;
        Ok(Self { pool, config })
    }

    /// Closes the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Parses a connection string into a [`ConnectionConfig`].
    ///
    /// Credentials are never copied into the returned configuration.
    ///
    /// # Errors
    /// Returns error if the connection string is malformed or contains
    /// invalid identifiers
    pub fn parse_connection_config(connection_string: &str) -> Result<ConnectionConfig> {
        Self::validate_connection_string(connection_string)?;

        let url = Url::parse(connection_string).map_err(|e| {
            NlQueryError::configuration(format!(
                "Invalid PostgreSQL connection string format: {e}"
            ))
        })?;

        let mut config = ConnectionConfig::new(url.host_str().unwrap_or("localhost").to_string())
            .with_port(url.port().unwrap_or(5432));

        let database = url.path().trim_start_matches('/');
        if !database.is_empty() {
            validate_identifier(database, "Database name")?;
            config = config.with_database(database.to_string());
        }

        let username = url.username();
        if !username.is_empty() {
            validate_identifier(username, "Username")?;
            config = config.with_username(username.to_string());
        }

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "connect_timeout" => {
                    if let Ok(timeout_secs) = value.parse::<u64>()
                        && timeout_secs > 0
                        && timeout_secs <= 300
                    {
                        config.connect_timeout = Duration::from_secs(timeout_secs);
                    }
                }
                "statement_timeout" => {
                    if let Ok(timeout_ms) = value.parse::<u64>()
                        && timeout_ms > 0
                    {
                        config.query_timeout = Duration::from_millis(timeout_ms);
                    }
                }
                "pool_max_conns" => {
                    if let Ok(max_conns) = value.parse::<u32>()
                        && max_conns > 0
                        && max_conns <= 100
                    {
                        config.max_connections = max_conns;
                    }
                }
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Creates a lazily-connecting pool whose sessions all carry the
    /// configured statement timeout, application name, and UTC timezone.
    pub(crate) fn create_connection_pool(
        connection_string: &str,
        config: &ConnectionConfig,
    ) -> Result<PgPool> {
        use sqlx::Executor;

        let query_timeout_ms = config.query_timeout.as_millis();
        let read_only = config.read_only;

        sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections.min(100))
            .acquire_timeout(config.connect_timeout)
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    conn.execute(format!("SET statement_timeout = {query_timeout_ms}").as_str())
                        .await?;

                    let app_name = format!("nlquery-{}", env!("CARGO_PKG_VERSION"));
                    conn.execute(format!("SET application_name = '{app_name}'").as_str())
                        .await?;

                    if read_only {
                        conn.execute("SET default_transaction_read_only = on")
                            .await?;
                    }

                    conn.execute("SET timezone = 'UTC'").await?;

                    Ok(())
                })
            })
            .connect_lazy(connection_string)
            .map_err(|e| NlQueryError::Connection {
                context: format!(
                    "Failed to create PostgreSQL connection pool to {}",
                    redact_database_url(connection_string)
                ),
                source: Box::new(e),
            })
    }

    /// Validates connection string format.
    ///
    /// # Errors
    /// Returns error if the scheme is not `postgres`/`postgresql` or no host
    /// is given
    pub fn validate_connection_string(connection_string: &str) -> Result<()> {
        let url = Url::parse(connection_string).map_err(|e| {
            NlQueryError::configuration(format!(
                "Invalid PostgreSQL connection string format: {e}"
            ))
        })?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(NlQueryError::configuration(
                "Connection string must use postgres:// or postgresql:// scheme",
            ));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(NlQueryError::configuration(
                "Connection string must specify a host",
            ));
        }

        Ok(())
    }
}

/// Checks PostgreSQL identifier rules for database and role names.
fn validate_identifier(value: &str, label: &str) -> Result<()> {
    if value.len() > 63 {
        return Err(NlQueryError::configuration(format!(
            "{label} too long: maximum 63 characters"
        )));
    }

    match value.chars().next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => {
            return Err(NlQueryError::configuration(format!(
                "{label} must start with a letter or underscore"
            )));
        }
    }

    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '-')
    {
        return Err(NlQueryError::configuration(format!(
            "{label} contains invalid characters"
        )));
    }

    Ok(())
}
