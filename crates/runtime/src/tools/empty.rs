//! Empty tool session implementation.

use super::{ToolDescriptor, ToolError, ToolOutput, ToolSession};
use serde_json::Value;

/// A tool session with no tools.
///
/// Useful for testing or for plain chat without a tool server.
#[derive(Debug, Default)]
pub struct EmptyToolSession;

impl ToolSession for EmptyToolSession {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        Ok(Vec::new())
    }

    async fn call_tool(&self, name: &str, _arguments: Value) -> Result<ToolOutput, ToolError> {
        Err(ToolError::NotFound(name.to_string()))
    }
}
