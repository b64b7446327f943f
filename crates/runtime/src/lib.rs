//! Tether runtime: model backends, tool sessions and the orchestration loop.
//!
//! # Overview
//!
//! - **Backend**: a trait abstracting chat-completion providers, with an
//!   OpenAI-compatible implementation in [`OpenAiBackend`].
//! - **ToolSession**: a trait abstracting a connected tool host, with an MCP
//!   implementation in [`McpToolSession`].
//! - **Orchestrator**: runs one query through tool discovery, a model turn,
//!   at most one round of tool calls and a closing model turn.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{McpToolSession, OpenAiAuth, OpenAiBackend, Orchestrator, QuerySettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = McpToolSession::connect(mcp::Transport::Stdio {
//!     command: "python".into(),
//!     args: vec!["server.py".into()],
//! })
//! .await?;
//! let backend = OpenAiBackend::builder("http://localhost:11434", OpenAiAuth::Placeholder).build();
//!
//! let orchestrator = Orchestrator::new(session, backend, QuerySettings::new("qwen2.5"));
//! let answer = orchestrator.process_query("What time is it?").await?;
//! println!("{answer}");
//!
//! orchestrator.into_session().close().await;
//! # Ok(())
//! # }
//! ```

mod error;
pub mod model;
mod orchestrator;
pub mod providers;
pub mod tools;

pub use error::{Error, Result};

pub use model::{Backend, Message, ModelError, Reply, ToolCallRequest, ToolSpec};
pub use orchestrator::{DEFAULT_MAX_TOKENS, FollowUp, Orchestrator, QuerySettings};
pub use providers::{OpenAiAuth, OpenAiBackend};
pub use tools::{EmptyToolSession, McpToolSession, ToolDescriptor, ToolError, ToolSession};
