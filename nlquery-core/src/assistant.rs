//! End-to-end question answering.
//!
//! [`SqlAssistant`] runs introspect → translate → execute → compose;
//! [`DocumentAssistant`] runs retrieve → compose. Both return the final
//! answer or an error that [`AskResponse::from_result`] turns into the
//! caller-facing contract.

use crate::{
    Result,
    adapters::{QueryRunner, SchemaProvider},
    completion::CompletionClient,
    composer::AnswerComposer,
    documents::{FragmentRetriever, Retrieval},
    executor::QueryExecutor,
    generator::SqlGenerator,
    models::{AskRequest, AskResponse},
    schema::SchemaIntrospector,
};
use std::{path::PathBuf, sync::Arc};

/// Answers questions from a relational database.
#[derive(Debug, Clone)]
pub struct SqlAssistant {
    introspector: SchemaIntrospector,
    generator: SqlGenerator,
    executor: QueryExecutor,
    composer: AnswerComposer,
}

impl SqlAssistant {
    /// Wires the SQL pipeline. `schema` and `runner` are usually the same
    /// database adapter.
    pub fn new(
        schema: Arc<dyn SchemaProvider>,
        runner: Arc<dyn QueryRunner>,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            introspector: SchemaIntrospector::new(schema),
            generator: SqlGenerator::new(Arc::clone(&client)),
            executor: QueryExecutor::new(runner),
            composer: AnswerComposer::new(client),
        }
    }

    /// Answers `question`.
    ///
    /// A translation failure stops the pipeline before the database is
    /// queried. Unsafe or failing SQL does not: the error payload is handed
    /// to the composer like any result.
    ///
    /// # Errors
    /// Introspection, completion, translation or composition failures
    pub async fn answer(&self, question: &str) -> Result<String> {
        let start = std::time::Instant::now();

        let schema = self.introspector.describe_schema().await?;
        let sql = self.generator.translate(question, &schema).await?;
        let outcome = self.executor.execute(&sql).await;
        let answer = self.composer.compose(question, &outcome.to_payload()?).await?;

        tracing::info!(
            "Answered database question in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(answer)
    }

    /// Applies [`SqlAssistant::answer`] to the request/response contract.
    pub async fn ask(&self, request: &AskRequest) -> AskResponse {
        let result = self.answer(&request.question).await;
        if let Err(e) = &result {
            tracing::error!("Database question failed: {}", e);
        }
        AskResponse::from_result(&result)
    }
}

/// Answers questions from the indexed documents.
#[derive(Debug, Clone)]
pub struct DocumentAssistant {
    index_path: PathBuf,
    retriever: FragmentRetriever,
    composer: AnswerComposer,
}

impl DocumentAssistant {
    /// Wires the document pipeline over the index persisted at `index_path`.
    pub fn new(index_path: impl Into<PathBuf>, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            index_path: index_path.into(),
            retriever: FragmentRetriever::new(),
            composer: AnswerComposer::new(client),
        }
    }

    /// Answers `question`. When nothing relevant is indexed the answer is
    /// the retrieval message and the model is not called.
    ///
    /// # Errors
    /// Index loading, completion or composition failures
    pub async fn answer(&self, question: &str) -> Result<String> {
        let retrieval = self
            .retriever
            .retrieve_persisted(question, &self.index_path)
            .await?;

        match retrieval {
            Retrieval::Fragments(fragments) => {
                tracing::info!("Answering from {} fragments", fragments.len());
                self.composer
                    .compose_from_fragments(question, &fragments)
                    .await
            }
            signal => {
                let message = signal.message().unwrap_or_default();
                tracing::info!("No fragments to answer from: {}", message);
                Ok(message.to_string())
            }
        }
    }

    /// Applies [`DocumentAssistant::answer`] to the request/response contract.
    pub async fn ask(&self, request: &AskRequest) -> AskResponse {
        let result = self.answer(&request.question).await;
        if let Err(e) = &result {
            tracing::error!("Document question failed: {}", e);
        }
        AskResponse::from_result(&result)
    }
}
