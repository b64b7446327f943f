//! MCP (Model Context Protocol) client sessions.
//!
//! Connects to a tool server over one of three transports and exposes tool
//! discovery and invocation on top of the official rmcp SDK.
//!
//! - `stdio`: spawn the server as a child process.
//! - `sse`: legacy HTTP+SSE (event stream plus POST endpoint).
//! - `streamablehttp`: streamable HTTP.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{Session, Transport};
//!
//! # async fn example() -> mcp::Result<()> {
//! let session = Session::connect(Transport::Stdio {
//!     command: "python".to_string(),
//!     args: vec!["server.py".to_string()],
//! })
//! .await?;
//!
//! for tool in session.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! let args = serde_json::json!({ "timezone": "UTC" });
//! let result = session.call_tool("get_time", args.as_object().cloned()).await?;
//! println!("{:?}", result.content);
//!
//! session.close().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod session;
mod sse;
mod transport;

pub use error::{Error, Result};
pub use rmcp::model::{CallToolResult, JsonObject, Tool};
pub use session::Session;
pub use transport::{Transport, TransportKind};
