//! OpenAI-compatible chat completions backend.

use crate::model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Reply, ToolCallRequest, ToolSpec,
    Usage,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key sent when no API key is configured. Local OpenAI-compatible servers
/// accept any bearer token.
const PLACEHOLDER_API_KEY: &str = "NONE";

/// Authentication mode for an OpenAI-compatible API.
///
/// Use `ApiKey` for hosted providers. `Placeholder` targets a local server:
/// it sends a dummy key and serves the API under `{base_url}/v1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenAiAuth {
    /// Bearer API key.
    ApiKey(String),
    /// No credentials configured.
    Placeholder,
}

impl std::fmt::Display for OpenAiAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiKey(_) => write!(f, "api_key"),
            Self::Placeholder => write!(f, "placeholder"),
        }
    }
}

impl OpenAiAuth {
    /// Pick the auth mode from an optional configured key. An empty key
    /// counts as missing.
    pub fn from_key(key: Option<&str>) -> Self {
        match key {
            Some(key) if !key.is_empty() => Self::ApiKey(key.to_string()),
            _ => Self::Placeholder,
        }
    }

    fn bearer(&self) -> &str {
        match self {
            Self::ApiKey(key) => key,
            Self::Placeholder => PLACEHOLDER_API_KEY,
        }
    }

    /// The API root for this auth mode.
    fn api_base(&self, base_url: &str) -> String {
        let base_url = base_url.trim_end_matches('/');
        match self {
            Self::ApiKey(_) => base_url.to_string(),
            Self::Placeholder => format!("{base_url}/v1"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

impl<'a> From<&ModelRequest<'a>> for ApiRequest<'a> {
    fn from(request: &ModelRequest<'a>) -> Self {
        let tools = request.tools.map(|specs| {
            specs
                .iter()
                .map(|function| ApiTool {
                    tool_type: "function",
                    function,
                })
                .collect::<Vec<_>>()
        });
        Self {
            model: request.model,
            max_tokens: request.max_tokens,
            messages: request.messages,
            tool_choice: tools.as_ref().map(|_| "auto"),
            tools,
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: &'a ToolSpec,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: Option<String>,
    function: ApiFunction,
}

#[derive(Debug, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl TryFrom<ApiResponse> for ModelResponse {
    type Error = ModelError;

    fn try_from(response: ApiResponse) -> Result<Self, ModelError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("response has no choices".into()))?;

        let calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCallRequest {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        let usage = response
            .usage
            .map(|u| Usage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(ModelResponse {
            reply: Reply::from_parts(choice.message.content, calls),
            usage,
        })
    }
}

/// Builder for creating an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    base_url: String,
    auth: OpenAiAuth,
}

impl OpenAiBackendBuilder {
    /// Create a new builder with the API base URL and authentication.
    pub fn new(base_url: impl Into<String>, auth: OpenAiAuth) -> Self {
        Self {
            base_url: base_url.into(),
            auth,
        }
    }

    /// Build the backend.
    pub fn build(self) -> OpenAiBackend {
        let endpoint = format!("{}/chat/completions", self.auth.api_base(&self.base_url));
        OpenAiBackend {
            client: reqwest::Client::new(),
            auth: self.auth,
            endpoint,
        }
    }
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    auth: OpenAiAuth,
    endpoint: String,
}

impl OpenAiBackend {
    /// Create a builder for the backend.
    pub fn builder(base_url: impl Into<String>, auth: OpenAiAuth) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(base_url, auth)
    }

    /// The chat completions URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({}, auth={})", self.endpoint, self.auth)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = ApiRequest::from(&request);

        debug!(
            model = request.model,
            messages = request.messages.len(),
            tools = request.tools.map(<[ToolSpec]>::len),
            "sending chat completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.auth.bearer())
            .json(&api_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        ModelResponse::try_from(api_response)
    }
}
