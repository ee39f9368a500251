//! Question to SQL translation.

use crate::{
    Result,
    completion::{CompletionClient, CompletionRequest},
    error::NlQueryError,
    models::SchemaDescription,
};
use std::sync::Arc;

/// Builds the system prompt for a schema.
pub fn generation_prompt(schema_json: &str) -> String {
    format!(
        "Given the following database schema, generate an SQL query that retrieves the requested information. \
The response should be in JSON format with the key \"sql_query\". \
Also, ensure that all column names in the generated query are enclosed in double quotes (\") to maintain proper SQL syntax. \
Keep in mind that primary keys or IDs are prefixed with the table name. For example, the primary key of 'Planta' is 'PlantaId'. \
<example>{{\"sql_query\": \"SELECT * FROM users WHERE age > 18;\", \"original_query\": \"Show me all users older than 18 years old.\"}}</example> \
<schema>{schema_json}</schema>"
    )
}

/// Asks the model for a SQL statement answering a question.
#[derive(Clone)]
pub struct SqlGenerator {
    client: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for SqlGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlGenerator")
            .field("model", &self.client.model_name())
            .finish()
    }
}

impl SqlGenerator {
    /// Creates a generator using the given completion client.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Translates `question` into a SQL statement over `schema`.
    ///
    /// # Errors
    /// - `Completion` if the service call fails
    /// - `Translation` if the reply is not a JSON object with a non-empty
    ///   string `sql_query`
    pub async fn translate(&self, question: &str, schema: &SchemaDescription) -> Result<String> {
        let request = CompletionRequest::system(generation_prompt(&schema.render()?))
            .with_user_message(question)
            .with_structured_output();

        let reply = self.client.complete(request).await?;
        let sql = parse_sql_reply(&reply)?;

        tracing::debug!("Generated SQL: {}", sql);
        Ok(sql)
    }
}

/// Extracts `sql_query` from the model reply.
///
/// # Errors
/// Returns a translation error when the reply is not a JSON object or the
/// key is missing, not a string, or blank
pub fn parse_sql_reply(reply: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(reply.trim())
        .map_err(|e| NlQueryError::translation(format!("reply is not JSON: {e}")))?;

    let object = value
        .as_object()
        .ok_or_else(|| NlQueryError::translation("reply is not a JSON object"))?;

    match object.get("sql_query") {
        Some(serde_json::Value::String(sql)) if !sql.trim().is_empty() => Ok(sql.clone()),
        Some(serde_json::Value::String(_)) => Err(NlQueryError::translation("sql_query is empty")),
        Some(_) => Err(NlQueryError::translation("sql_query is not a string")),
        None => Err(NlQueryError::translation("reply has no sql_query key")),
    }
}
