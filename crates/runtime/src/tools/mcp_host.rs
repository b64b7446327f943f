//! MCP-backed tool session.

use super::{ToolDescriptor, ToolError, ToolOutput, ToolSession};
use mcp::{JsonObject, Session, Tool, Transport};
use serde_json::Value;
use tracing::warn;

impl From<Tool> for ToolDescriptor {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.into_owned(),
            description: tool.description.map(|d| d.into_owned()).unwrap_or_default(),
            input_schema: Value::Object((*tool.input_schema).clone()),
        }
    }
}

/// Tool session backed by an MCP server.
pub struct McpToolSession {
    session: Session,
}

impl McpToolSession {
    /// Connect to the server and complete the initialize handshake.
    pub async fn connect(transport: Transport) -> Result<Self, mcp::Error> {
        Ok(Self::new(Session::connect(transport).await?))
    }

    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Shut the session down, logging rather than failing.
    pub async fn close(self) {
        if let Err(e) = self.session.close().await {
            warn!("failed to close MCP session: {e}");
        }
    }
}

/// MCP takes an argument object; `null` means no arguments.
fn into_arguments(name: &str, arguments: Value) -> Result<Option<JsonObject>, ToolError> {
    match arguments {
        Value::Object(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        other => Err(ToolError::InvalidInput(format!(
            "arguments for {name} must be a JSON object, got {other}"
        ))),
    }
}

impl ToolSession for McpToolSession {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolError> {
        let tools = self
            .session
            .list_tools()
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        Ok(tools.into_iter().map(ToolDescriptor::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let arguments = into_arguments(name, arguments)?;
        let result = self
            .session
            .call_tool(name, arguments)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        let content = serde_json::to_value(&result.content)
            .map_err(|e| ToolError::Execution(format!("serialize result: {e}")))?;
        Ok(ToolOutput { content })
    }
}
