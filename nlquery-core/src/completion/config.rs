//! Completion service configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default completion endpoint base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Settings for the completion client.
///
/// The API key is never serialized and is redacted in `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Endpoint base URL, without the `/v1/chat/completions` path
    pub base_url: String,
    /// Bearer token
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Timeout applied to each HTTP call
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"****")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CompletionConfig {
    /// Creates a configuration with defaults and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Builder method to set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builder method to set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method to set the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Chat completions URL derived from the base URL.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns a configuration error for an empty key or model, a base URL
    /// that is not http(s), or a zero timeout
    pub fn validate(&self) -> crate::Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(crate::error::NlQueryError::configuration(
                "completion API key cannot be empty",
            ));
        }

        if self.model.trim().is_empty() {
            return Err(crate::error::NlQueryError::configuration(
                "completion model cannot be empty",
            ));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(crate::error::NlQueryError::configuration(
                    "completion base URL must be an http(s) URL",
                ));
            }
        }

        if self.timeout.is_zero() {
            return Err(crate::error::NlQueryError::configuration(
                "completion timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
