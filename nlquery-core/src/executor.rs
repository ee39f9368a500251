//! Policy-checked execution of generated SQL.

use crate::{adapters::QueryRunner, models::QueryOutcome, safety::SqlSafetyValidator};
use std::sync::Arc;

/// Payload returned when the deny-list rejects a statement.
pub const UNSAFE_QUERY_MESSAGE: &str = "invalid or dangerous SQL query detected";
/// Payload returned when the database fails to run a statement.
pub const EXECUTION_FAILED_MESSAGE: &str = "problem executing the query";

/// Runs statements that pass the safety check.
///
/// Rejections and driver failures are returned as [`QueryOutcome::Error`]
/// so the answer composer can still explain them; the driver's message is
/// only logged.
#[derive(Clone)]
pub struct QueryExecutor {
    runner: Arc<dyn QueryRunner>,
    validator: SqlSafetyValidator,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor").finish_non_exhaustive()
    }
}

impl QueryExecutor {
    /// Creates an executor over a query runner.
    pub fn new(runner: Arc<dyn QueryRunner>) -> Self {
        Self {
            runner,
            validator: SqlSafetyValidator::new(),
        }
    }

    /// Validates and runs `sql`.
    pub async fn execute(&self, sql: &str) -> QueryOutcome {
        if let Some(keyword) = self.validator.first_violation(sql) {
            tracing::warn!("Rejected generated SQL containing {}", keyword);
            return QueryOutcome::error(UNSAFE_QUERY_MESSAGE);
        }

        let start = std::time::Instant::now();
        match self.runner.fetch_rows(sql).await {
            Ok(rows) => {
                tracing::info!(
                    "Query returned {} rows in {:.2}s",
                    rows.len(),
                    start.elapsed().as_secs_f64()
                );
                QueryOutcome::Rows(rows)
            }
            Err(e) => {
                tracing::warn!("Query execution failed: {}", e);
                QueryOutcome::error(EXECUTION_FAILED_MESSAGE)
            }
        }
    }
}
