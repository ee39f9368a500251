//! OpenAI-compatible chat completions client.

use super::{CompletionClient, CompletionConfig, CompletionRequest, types::ChatCompletionReply};
use crate::{Result, error::NlQueryError};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// Client for any endpoint speaking the OpenAI chat completions protocol.
///
/// Immutable after construction; headers are built for every call. No
/// retries are attempted.
pub struct OpenAiCompletionClient {
    config: CompletionConfig,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenAiCompletionClient {
    /// Creates a client from a validated configuration.
    ///
    /// # Errors
    /// Returns a configuration error if the settings are invalid, or a
    /// completion error if the HTTP client cannot be built
    pub fn new(config: CompletionConfig) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NlQueryError::completion_failed("Failed to build HTTP client", e))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
                .map_err(|_| NlQueryError::configuration("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = request.to_wire(&self.config.model);
        let start = std::time::Instant::now();

        tracing::debug!(
            "Sending completion request: {} messages, structured={}",
            body.messages.len(),
            request.structured_output
        );

        let response = self
            .http_client
            .post(self.config.endpoint())
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| NlQueryError::completion_failed("Completion request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Completion service returned {}: {}", status, error_text);
            return Err(NlQueryError::completion(format!(
                "Completion service returned {status}"
            )));
        }

        let reply: ChatCompletionReply = response
            .json()
            .await
            .map_err(|e| NlQueryError::completion_failed("Failed to parse completion reply", e))?;

        let content = reply
            .first_content()
            .ok_or_else(|| NlQueryError::completion("Completion reply has no message content"))?;

        tracing::debug!(
            "Completion reply received in {:.2}s ({} chars)",
            start.elapsed().as_secs_f64(),
            content.chars().count()
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
