//! External completion service.
//!
//! # Module Structure
//! - `config`: Endpoint, key, model and timeout settings
//! - `types`: Pipeline-facing request and the chat completions wire format
//! - `openai`: HTTP client for OpenAI-compatible endpoints

mod config;
mod openai;
pub mod types;

pub use config::{CompletionConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use openai::OpenAiCompletionClient;
pub use types::CompletionRequest;

use crate::Result;
use async_trait::async_trait;

/// Sends one chat request and returns the text of the first reply.
///
/// # Object Safety
/// This trait is object-safe; the pipelines hold an
/// `Arc<dyn CompletionClient>` so tests can substitute a scripted client.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Performs a single completion call.
    ///
    /// # Errors
    /// Returns a completion error on transport failure, a non-success
    /// status, or a reply without content
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Model identifier used for requests.
    fn model_name(&self) -> &str;
}
