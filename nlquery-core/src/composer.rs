//! Natural-language answer synthesis.

use crate::{
    Result,
    completion::{CompletionClient, CompletionRequest},
    error::NlQueryError,
};
use std::sync::Arc;

/// Builds the prompt answering `question` from a query payload.
pub fn answer_prompt(question: &str, payload: &str) -> String {
    format!(
        "Given a user's question and the SQL rows response from the database, write a response to the user's question. \
Ensure that the response is clear and directly answers the question. \
Example: User question: \"How many users are in the database?\" SQL response: [{{ \"count\": 1200 }}] \
Expected answer: \"There are 1,200 users in the database.\" \
User question: \"{question}\" SQL response: {payload}"
    )
}

/// Builds the prompt answering `question` from document fragments.
pub fn documents_prompt(question: &str, fragments: &[String]) -> String {
    format!(
        "Given the following extracted text from various documents, answer the user's question based on their content. \
Ensure that the response is clear and directly answers the question.\n\n\
<documents>\n{}\n</documents>\n\n\
User question: {question}",
        fragments.join("\n\n")
    )
}

/// Turns query results or document fragments into a final answer.
#[derive(Clone)]
pub struct AnswerComposer {
    client: Arc<dyn CompletionClient>,
}

impl std::fmt::Debug for AnswerComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerComposer")
            .field("model", &self.client.model_name())
            .finish()
    }
}

impl AnswerComposer {
    /// Creates a composer using the given completion client.
    pub fn new(client: Arc<dyn CompletionClient>) -> Self {
        Self { client }
    }

    /// Answers `question` from the serialized query outcome.
    ///
    /// # Errors
    /// - `Completion` if the service call fails
    /// - `Composition` if the reply is blank
    pub async fn compose(&self, question: &str, payload: &str) -> Result<String> {
        self.answer(answer_prompt(question, payload)).await
    }

    /// Answers `question` from retrieved document fragments.
    ///
    /// # Errors
    /// Same as [`AnswerComposer::compose`]
    pub async fn compose_from_fragments(
        &self,
        question: &str,
        fragments: &[String],
    ) -> Result<String> {
        self.answer(documents_prompt(question, fragments)).await
    }

    async fn answer(&self, prompt: String) -> Result<String> {
        tracing::debug!("Composing answer from a {} char prompt", prompt.chars().count());

        let reply = self.client.complete(CompletionRequest::system(prompt)).await?;
        if reply.trim().is_empty() {
            return Err(NlQueryError::composition("completion reply was blank"));
        }
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingClient {
        reply: String,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl RecordingClient {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for RecordingClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_compose_sends_single_system_message() {
        let client = RecordingClient::replying("There are 3 plants.");
        let composer = AnswerComposer::new(client.clone());

        let answer = composer
            .compose("how many plants are there?", r#"[{"count":3}]"#)
            .await
            .unwrap();
        assert_eq!(answer, "There are 3 plants.");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].user_message.is_none());
        assert!(!seen[0].structured_output);
        assert!(seen[0].system_message.contains("There are 1,200 users in the database."));
        assert!(
            seen[0]
                .system_message
                .ends_with(r#"User question: "how many plants are there?" SQL response: [{"count":3}]"#)
        );
    }

    #[tokio::test]
    async fn test_blank_reply_is_composition_failure() {
        let composer = AnswerComposer::new(RecordingClient::replying("  \n"));
        let result = composer.compose("q", "[]").await;
        assert!(matches!(result, Err(NlQueryError::Composition { .. })));
    }

    #[test]
    fn test_documents_prompt_joins_fragments() {
        let prompt = documents_prompt(
            "what is watered weekly?",
            &["Ficus: weekly".to_string(), "Aloe: monthly".to_string()],
        );
        assert!(prompt.contains("<documents>\nFicus: weekly\n\nAloe: monthly\n</documents>"));
        assert!(prompt.ends_with("User question: what is watered weekly?"));
    }
}
