//! LLM protocol types and backend trait.

pub mod errors;
pub mod types;

pub use errors::ModelError;
pub use types::{
    Backend, Content, Conversation, Message, ModelRequest, ModelResponse, Reply, Role,
    ToolCallRequest, ToolSpec, Usage,
};
