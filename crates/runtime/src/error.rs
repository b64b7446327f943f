use crate::model::ModelError;
use crate::tools::ToolError;
use thiserror::Error;

/// Errors from a query run.
///
/// Nothing is recovered inside the run: each variant aborts the query and
/// reaches the caller as is.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("tool discovery failed: {0}")]
    ToolDiscovery(#[source] ToolError),

    #[error("invalid arguments for tool {tool}: {source}")]
    ArgumentParse {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tool {tool} failed: {source}")]
    ToolExecution {
        tool: String,
        #[source]
        source: ToolError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, Error>;
