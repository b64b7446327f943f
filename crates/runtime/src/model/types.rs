use super::errors::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Message content: plain text, or a tool result payload passed through
/// without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Payload(Value),
}

/// A message in the conversation.
///
/// Assistant messages that only carried tool calls have no content; they
/// serialize as `"content": null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: Option<Content>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(Content::Text(text.into())),
        }
    }

    pub fn assistant(text: Option<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.map(Content::Text),
        }
    }

    /// A tool's output, fed back to the model as a user turn.
    pub fn tool_output(payload: Value) -> Self {
        Self {
            role: Role::User,
            content: Some(Content::Payload(payload)),
        }
    }
}

/// Ordered message history for a single query.
///
/// Append-only: messages keep the order they were produced in.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with the user's query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(query)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}

/// A function tool offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the arguments.
    pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallRequest {
    /// Provider-assigned call id, when the provider sends one.
    pub id: Option<String>,
    pub name: String,
    /// Arguments exactly as the model emitted them (JSON-encoded).
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// What the model answered with.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A plain answer, no tools requested.
    Text(Option<String>),
    /// One or more tool calls, with whatever text accompanied them.
    ToolCalls {
        content: Option<String>,
        calls: Vec<ToolCallRequest>,
    },
}

impl Reply {
    /// Classify a provider message. An empty call list counts as no calls.
    pub fn from_parts(content: Option<String>, calls: Vec<ToolCallRequest>) -> Self {
        if calls.is_empty() {
            Self::Text(content)
        } else {
            Self::ToolCalls { content, calls }
        }
    }

    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Text(content) | Self::ToolCalls { content, .. } => content,
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl Usage {
    pub fn total_tokens(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Everything needed for a model request.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub model: &'a str,
    pub max_tokens: u32,
    pub messages: &'a [Message],
    /// Tools offered with automatic tool choice. `None` offers no tools at
    /// all; `Some(&[])` still sends an empty list.
    pub tools: Option<&'a [ToolSpec]>,
}

/// The response from a model.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub reply: Reply,
    pub usage: Usage,
}

/// Trait for LLM provider backends.
pub trait Backend: Send + Sync {
    fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}
