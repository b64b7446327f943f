//! Transport selection.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The kind of connection made to an MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Child process speaking JSON-RPC over stdin/stdout.
    Stdio,
    /// Legacy HTTP+SSE: a GET event stream plus a POST endpoint.
    Sse,
    /// Streamable HTTP.
    StreamableHttp,
}

impl TransportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamablehttp",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamablehttp" => Ok(Self::StreamableHttp),
            other => Err(Error::UnknownTransport(other.to_string())),
        }
    }
}

/// Where and how to reach an MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Stdio { command: String, args: Vec<String> },
    Sse { url: String },
    StreamableHttp { url: String },
}

impl Transport {
    pub fn kind(&self) -> TransportKind {
        match self {
            Self::Stdio { .. } => TransportKind::Stdio,
            Self::Sse { .. } => TransportKind::Sse,
            Self::StreamableHttp { .. } => TransportKind::StreamableHttp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds() {
        assert_eq!("stdio".parse::<TransportKind>().unwrap(), TransportKind::Stdio);
        assert_eq!("sse".parse::<TransportKind>().unwrap(), TransportKind::Sse);
        assert_eq!(
            "streamablehttp".parse::<TransportKind>().unwrap(),
            TransportKind::StreamableHttp
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = "websocket".parse::<TransportKind>().unwrap_err();
        assert!(matches!(err, Error::UnknownTransport(ref kind) if kind == "websocket"));
        // Matching is exact.
        assert!("STDIO".parse::<TransportKind>().is_err());
        assert!("streamable-http".parse::<TransportKind>().is_err());
    }

    #[test]
    fn transport_reports_kind() {
        let transport = Transport::Sse {
            url: "http://localhost:8000/sse".into(),
        };
        assert_eq!(transport.kind(), TransportKind::Sse);
    }
}
