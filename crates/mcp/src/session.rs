//! Connected MCP sessions.

use rmcp::{
    RoleClient, ServiceExt,
    model::{CallToolRequestParams, CallToolResult, JsonObject, Tool},
    service::RunningService,
    transport::{ConfigureCommandExt, StreamableHttpClientTransport, TokioChildProcess},
};
use tokio::process::Command;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::sse;
use crate::transport::{Transport, TransportKind};

/// Background tasks owned by a transport, aborted on drop.
#[derive(Default)]
struct TransportTasks(Vec<AbortHandle>);

impl Drop for TransportTasks {
    fn drop(&mut self) {
        for task in &self.0 {
            task.abort();
        }
    }
}

/// An initialized MCP client session.
///
/// Dropping the session cancels the service and stops the transport; call
/// [`Session::close`] to wait for the shutdown to finish.
pub struct Session {
    service: RunningService<RoleClient, ()>,
    kind: TransportKind,
    _tasks: TransportTasks,
}

impl Session {
    /// Connect to a server and run the initialize handshake.
    pub async fn connect(transport: Transport) -> Result<Self> {
        let kind = transport.kind();
        let (service, tasks) = match transport {
            Transport::Stdio { command, args } => {
                debug!(%command, ?args, "spawning MCP server");
                let child = TokioChildProcess::new(Command::new(&command).configure(|cmd| {
                    cmd.args(&args);
                }))?;
                let service = ().serve(child).await.map_err(initialize_error)?;
                (service, TransportTasks::default())
            }
            Transport::Sse { url } => {
                debug!(%url, "opening SSE stream");
                let sse = sse::connect(reqwest::Client::new(), &url).await?;
                // Built before serving so a failed handshake still stops the tasks.
                let tasks = TransportTasks(sse.tasks);
                let service = ().serve((sse.sink, sse.stream)).await.map_err(initialize_error)?;
                (service, tasks)
            }
            Transport::StreamableHttp { url } => {
                debug!(%url, "connecting over streamable HTTP");
                let transport = StreamableHttpClientTransport::from_uri(url);
                let service = ().serve(transport).await.map_err(initialize_error)?;
                (service, TransportTasks::default())
            }
        };

        info!(%kind, "connected to MCP server");
        Ok(Self {
            service,
            kind,
            _tasks: tasks,
        })
    }

    /// List every tool the server offers, following pagination.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self.service.list_all_tools().await?)
    }

    /// Call a tool by name.
    ///
    /// A result the server flags with `isError` is returned as
    /// [`Error::ToolCallFailed`].
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult> {
        let params = CallToolRequestParams {
            name: name.into().into(),
            arguments,
            meta: None,
            task: None,
        };

        let result = self.service.call_tool(params).await?;

        if result.is_error.unwrap_or(false) {
            let error_text = result
                .content
                .iter()
                .filter_map(|c| c.as_text())
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::ToolCallFailed(error_text));
        }

        Ok(result)
    }

    /// Cancel the service and wait for the transport to shut down.
    pub async fn close(self) -> Result<()> {
        let Self { service, kind, _tasks } = self;
        let reason = service
            .cancel()
            .await
            .map_err(|e| Error::Shutdown(e.to_string()))?;
        debug!(%kind, ?reason, "MCP session closed");
        Ok(())
    }
}

fn initialize_error(e: impl std::fmt::Display) -> Error {
    Error::Initialize(e.to_string())
}
