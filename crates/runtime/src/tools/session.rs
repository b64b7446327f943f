//! Tool session trait.

use super::{ToolDescriptor, ToolError, ToolOutput};
use serde_json::Value;
use std::future::Future;

/// A connected tool host.
///
/// Implementations discover tools and execute calls. This is the boundary
/// between the orchestration loop and side effects.
pub trait ToolSession: Send + Sync {
    /// Fetch the tools currently on offer.
    fn list_tools(&self) -> impl Future<Output = Result<Vec<ToolDescriptor>, ToolError>> + Send;

    /// Execute a tool with already-parsed arguments.
    fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> impl Future<Output = Result<ToolOutput, ToolError>> + Send;
}
