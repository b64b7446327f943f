//! The tool-call orchestration loop.
//!
//! One query runs through: tool discovery, a first model turn with the tools
//! on offer, at most one round of tool execution, and a follow-up turn with
//! no tools that produces the closing answer.

use crate::model::{Backend, Conversation, Message, ModelRequest, ModelResponse, Reply, ToolSpec};
use crate::tools::ToolSession;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Token budget used when none is configured.
pub const DEFAULT_MAX_TOKENS: u32 = 8096;

/// When to make the follow-up model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    /// Always ask again, even if the first turn called no tools; the
    /// first answer and the second are both returned.
    #[default]
    Always,
    /// Only ask again after tools ran. A plain first answer is final.
    AfterToolCalls,
}

/// Model settings shared by both turns of a query.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub model: String,
    /// Unset or zero means [`DEFAULT_MAX_TOKENS`].
    pub max_tokens: Option<u32>,
    pub follow_up: FollowUp,
}

impl QuerySettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            follow_up: FollowUp::default(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_follow_up(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = follow_up;
        self
    }

    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Text fragments collected during one run, in the order produced.
#[derive(Debug, Default)]
struct Transcript {
    fragments: Vec<String>,
}

impl Transcript {
    fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    fn into_text(self) -> String {
        self.fragments.join("\n")
    }
}

/// Drives queries through a tool session and a model backend.
///
/// Holds no conversation state between queries: every call to
/// [`Orchestrator::process_query`] starts from the query alone.
pub struct Orchestrator<S, B> {
    session: S,
    backend: B,
    settings: QuerySettings,
}

impl<S: ToolSession, B: Backend> Orchestrator<S, B> {
    pub fn new(session: S, backend: B, settings: QuerySettings) -> Self {
        Self {
            session,
            backend,
            settings,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Give back the tool session so the caller can shut it down.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Answer one query, calling tools if the model asks for them.
    ///
    /// The result joins, with newlines, a `[Calling tool ...]` line per tool
    /// call (or the first answer when no tools were called) followed by the
    /// follow-up answer.
    #[tracing::instrument(skip_all, fields(model = %self.settings.model))]
    pub async fn process_query(&self, query: &str) -> Result<String> {
        let mut conversation = Conversation::new(query);

        let tools: Vec<ToolSpec> = self
            .session
            .list_tools()
            .await
            .map_err(Error::ToolDiscovery)?
            .iter()
            .map(ToolSpec::from)
            .collect();
        debug!(count = tools.len(), "discovered tools");

        let first = self
            .complete(conversation.messages(), Some(tools.as_slice()))
            .await?;

        let mut transcript = Transcript::default();
        match first.reply {
            Reply::Text(content) => {
                let text = content.unwrap_or_default();
                if self.settings.follow_up == FollowUp::AfterToolCalls {
                    return Ok(text);
                }
                transcript.push(text);
            }
            Reply::ToolCalls { content, calls } => {
                conversation.push(Message::assistant(content));
                for call in calls {
                    let arguments = parse_arguments(&call.name, &call.arguments)?;
                    let announcement =
                        format!("[Calling tool {} with args {arguments}]", call.name);

                    info!(tool = %call.name, "calling tool");
                    let output = self
                        .session
                        .call_tool(&call.name, arguments)
                        .await
                        .map_err(|source| Error::ToolExecution {
                            tool: call.name.clone(),
                            source,
                        })?;

                    transcript.push(announcement);
                    conversation.push(Message::tool_output(output.content));
                }
            }
        }

        // No tools on the follow-up turn: one round of tool calls per query.
        let second = self.complete(conversation.messages(), None).await?;
        transcript.push(second.reply.into_content().unwrap_or_default());

        Ok(transcript.into_text())
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: Option<&[ToolSpec]>,
    ) -> Result<ModelResponse> {
        let request = ModelRequest {
            model: &self.settings.model,
            max_tokens: self.settings.effective_max_tokens(),
            messages,
            tools,
        };
        let response = self.backend.call(request).await?;
        debug!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            total_tokens = response.usage.total_tokens(),
            tool_calls = matches!(response.reply, Reply::ToolCalls { .. }),
            "model replied"
        );
        Ok(response)
    }
}

fn parse_arguments(tool: &str, raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|source| Error::ArgumentParse {
        tool: tool.to_string(),
        source,
    })
}
