//! MCP error types.

use thiserror::Error;

/// MCP session errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to spawn server: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("unknown transport '{0}': expected stdio, sse or streamablehttp")]
    UnknownTransport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid SSE endpoint: {0}")]
    Endpoint(String),

    #[error("initialize handshake failed: {0}")]
    Initialize(String),

    #[error(transparent)]
    Service(#[from] rmcp::service::ServiceError),

    #[error("tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("shutdown failed: {0}")]
    Shutdown(String),
}

pub type Result<T> = std::result::Result<T, Error>;
