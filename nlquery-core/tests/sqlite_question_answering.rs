//! End-to-end SQL question answering against an in-memory SQLite database.
//!
//! The completion service is replaced by a scripted client that replays
//! canned replies and records every request it receives.

#![cfg(feature = "sqlite")]

use async_trait::async_trait;
use nlquery_core::{
    AskRequest, AskResponse, CompletionClient, CompletionRequest, NlQueryError, QueryResult,
    QueryRunner, Result, SqlAssistant, adapters::sqlite::SqliteAdapter,
};
use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Replays replies in order and records requests.
struct ScriptedClient {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| (*r).to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| NlQueryError::completion("script exhausted"))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Counts statements reaching the database.
struct CountingRunner {
    inner: Arc<SqliteAdapter>,
    calls: AtomicUsize,
}

#[async_trait]
impl QueryRunner for CountingRunner {
    async fn fetch_rows(&self, sql: &str) -> Result<QueryResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch_rows(sql).await
    }
}

async fn plants_database() -> Arc<SqliteAdapter> {
    let adapter = SqliteAdapter::new("sqlite::memory:").await.unwrap();

    sqlx::query("CREATE TABLE Planta (Id INTEGER PRIMARY KEY, Nombre TEXT NOT NULL)")
        .execute(&adapter.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO Planta (Id, Nombre) VALUES (1, 'Ficus'), (2, 'Aloe'), (3, 'Monstera')")
        .execute(&adapter.pool)
        .await
        .unwrap();

    Arc::new(adapter)
}

fn assistant_with(
    database: &Arc<SqliteAdapter>,
    client: &Arc<ScriptedClient>,
) -> (SqlAssistant, Arc<CountingRunner>) {
    let runner = Arc::new(CountingRunner {
        inner: Arc::clone(database),
        calls: AtomicUsize::new(0),
    });
    let assistant = SqlAssistant::new(database.clone(), runner.clone(), client.clone());
    (assistant, runner)
}

// ===== Happy path =====

#[tokio::test]
async fn test_count_question_is_answered_from_rows() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&[
        r#"{"sql_query": "SELECT COUNT(*) AS count FROM \"Planta\"", "original_query": "how many plants are there?"}"#,
        "There are 3 plants in the database.",
    ]);
    let (assistant, runner) = assistant_with(&database, &client);

    let answer = assistant.answer("how many plants are there?").await?;

    assert!(answer.contains('3'));
    assert_eq!(runner.calls.load(Ordering::SeqCst), 1);

    let requests = client.requests();
    assert_eq!(requests.len(), 2);

    // Translation request: schema in the system message, question as user turn
    assert!(requests[0].structured_output);
    assert_eq!(
        requests[0].user_message.as_deref(),
        Some("how many plants are there?")
    );
    assert!(requests[0].system_message.contains(r#""column_name": "PlantaId""#));
    assert!(requests[0].system_message.contains(r#""column_type": "int""#));
    assert!(requests[0].system_message.contains(r#""column_name": "Nombre""#));

    // Composition request: system message only, with the literal payload
    assert!(!requests[1].structured_output);
    assert!(requests[1].user_message.is_none());
    assert!(requests[1].system_message.contains(r#"SQL response: [{"count":3}]"#));

    Ok(())
}

#[tokio::test]
async fn test_ask_wraps_answer_in_contract() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&[
        r#"{"sql_query": "SELECT \"Nombre\" FROM \"Planta\" ORDER BY \"Id\""}"#,
        "Ficus, Aloe and Monstera.",
    ]);
    let (assistant, _) = assistant_with(&database, &client);

    let response = assistant
        .ask(&AskRequest {
            question: "which plants are there?".to_string(),
        })
        .await;

    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"answer":"Ficus, Aloe and Monstera."}"#
    );
    assert!(
        client.requests()[1]
            .system_message
            .contains(r#"[{"Nombre":"Ficus"},{"Nombre":"Aloe"},{"Nombre":"Monstera"}]"#)
    );
    Ok(())
}

// ===== Translation failures =====

#[tokio::test]
async fn test_non_json_reply_stops_before_database() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&["SELECT COUNT(*) FROM Planta"]);
    let (assistant, runner) = assistant_with(&database, &client);

    let result = assistant.answer("how many plants are there?").await;

    assert!(matches!(result, Err(NlQueryError::Translation { .. })));
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    assert_eq!(client.requests().len(), 1);

    let response = AskResponse::from_result(&result);
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"error":"failed to generate the SQL query"}"#
    );
    Ok(())
}

// ===== Rejected and failing statements =====

#[tokio::test]
async fn test_destructive_sql_is_not_executed() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&[
        r#"{"sql_query": "DELETE FROM \"Planta\""}"#,
        "I cannot do that.",
    ]);
    let (assistant, runner) = assistant_with(&database, &client);

    let answer = assistant.answer("remove every plant").await?;

    assert_eq!(answer, "I cannot do that.");
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    assert!(
        client.requests()[1]
            .system_message
            .contains(r#"{"error":"invalid or dangerous SQL query detected"}"#)
    );

    let remaining = database
        .fetch_rows("SELECT COUNT(*) AS count FROM Planta")
        .await?;
    assert_eq!(serde_json::to_string(&remaining).unwrap(), r#"[{"count":3}]"#);
    Ok(())
}

#[tokio::test]
async fn test_failing_sql_is_explained_without_driver_detail() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&[
        r#"{"sql_query": "SELECT * FROM \"Plantas\""}"#,
        "The query could not be run.",
    ]);
    let (assistant, runner) = assistant_with(&database, &client);

    assistant.answer("list the plants").await?;

    assert_eq!(runner.calls.load(Ordering::SeqCst), 1);
    let prompt = &client.requests()[1].system_message;
    assert!(prompt.contains(r#"{"error":"problem executing the query"}"#));
    assert!(!prompt.contains("no such table"));
    Ok(())
}

// ===== Completion failures =====

#[tokio::test]
async fn test_blank_answer_is_composition_failure() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&[r#"{"sql_query": "SELECT 1 AS one"}"#, "   "]);
    let (assistant, _) = assistant_with(&database, &client);

    let response = assistant
        .ask(&AskRequest {
            question: "one?".to_string(),
        })
        .await;

    assert_eq!(
        response,
        AskResponse::Error {
            error: "failed to generate the answer".to_string()
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_completion_outage_is_internal_error() -> Result<()> {
    let database = plants_database().await;
    let client = ScriptedClient::new(&[]);
    let (assistant, runner) = assistant_with(&database, &client);

    let response = assistant
        .ask(&AskRequest {
            question: "how many plants are there?".to_string(),
        })
        .await;

    assert_eq!(
        response,
        AskResponse::Error {
            error: "problem with the completion service".to_string()
        }
    );
    assert_eq!(runner.calls.load(Ordering::SeqCst), 0);
    Ok(())
}
