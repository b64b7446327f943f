//! Tool sessions: discovery and execution.

mod empty;
pub mod errors;
mod mcp_host;
mod session;
mod types;

pub use empty::EmptyToolSession;
pub use errors::ToolError;
pub use mcp_host::McpToolSession;
pub use session::ToolSession;
pub use types::{ToolDescriptor, ToolOutput};
