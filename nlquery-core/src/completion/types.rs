//! Request and wire types for chat completions.

use serde::{Deserialize, Serialize};

/// What a pipeline asks of the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Instructions and context, always sent first
    pub system_message: String,
    /// Optional user turn following the system message
    pub user_message: Option<String>,
    /// Ask the service for a JSON object reply
    pub structured_output: bool,
}

impl CompletionRequest {
    /// Creates a request carrying only a system message.
    pub fn system(system_message: impl Into<String>) -> Self {
        Self {
            system_message: system_message.into(),
            user_message: None,
            structured_output: false,
        }
    }

    /// Adds a user message.
    #[must_use]
    pub fn with_user_message(mut self, user_message: impl Into<String>) -> Self {
        self.user_message = Some(user_message.into());
        self
    }

    /// Requests a JSON object reply.
    #[must_use]
    pub const fn with_structured_output(mut self) -> Self {
        self.structured_output = true;
        self
    }

    /// Builds the wire body for `model`.
    pub fn to_wire(&self, model: &str) -> ChatCompletionBody {
        let mut messages = vec![ChatMessage {
            role: ChatRole::System,
            content: self.system_message.clone(),
        }];
        if let Some(user_message) = &self.user_message {
            messages.push(ChatMessage {
                role: ChatRole::User,
                content: user_message.clone(),
            });
        }

        ChatCompletionBody {
            model: model.to_string(),
            response_format: self.structured_output.then(ResponseFormat::json_object),
            messages,
        }
    }
}

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// `response_format` field of the request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// The `{"type": "json_object"}` format.
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// Body of `POST /v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionBody {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    pub messages: Vec<ChatMessage>,
}

/// Reply of `POST /v1/chat/completions`; only the fields read are modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionReply {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ReplyMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionReply {
    /// Content of the first choice, if present.
    pub fn first_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}
