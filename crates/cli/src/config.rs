//! Configuration loading from a TOML file.

use mcp::{Transport, TransportKind};
use runtime::{FollowUp, OpenAiAuth, OpenAiBackend, QuerySettings};
use serde::Deserialize;
use std::path::Path;

/// Client configuration.
///
/// Keys are flat, one setting per key:
///
/// ```toml
/// mcp_type = "stdio"
/// server_script_path = "server/time_server.py"
/// model = "qwen2.5:7b"
/// base_url = "http://localhost:11434"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Transport kind: `stdio`, `sse` or `streamablehttp`.
    pub mcp_type: Option<String>,

    /// Server script to launch (`.py` or `.js`). Required for `stdio`.
    pub server_script_path: Option<String>,

    /// Server URL. Required for `sse` and `streamablehttp`.
    pub mcp_url: Option<String>,

    /// Model to use.
    pub model: Option<String>,

    /// Response token budget; unset or zero means the default.
    pub max_tokens: Option<u32>,

    /// Base URL of the OpenAI-compatible API.
    pub base_url: Option<String>,

    /// API key. When missing or empty a placeholder key is sent and `/v1`
    /// is appended to `base_url`.
    pub api_key: Option<String>,

    /// When to make the follow-up model call: `always` or
    /// `after_tool_calls`.
    #[serde(default)]
    pub follow_up: FollowUp,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Build the MCP transport from `mcp_type` and its settings.
    pub fn transport(&self) -> Result<Transport, ConfigError> {
        let kind = required(&self.mcp_type, "mcp_type")?;
        let kind: TransportKind = kind
            .parse()
            .map_err(|_| ConfigError::InvalidTransport(kind.to_string()))?;

        match kind {
            TransportKind::Stdio => {
                let script = required(&self.server_script_path, "server_script_path")?;
                let command = script_interpreter(script)?;
                Ok(Transport::Stdio {
                    command: command.to_string(),
                    args: vec![script.to_string()],
                })
            }
            TransportKind::Sse => Ok(Transport::Sse {
                url: required(&self.mcp_url, "mcp_url")?.to_string(),
            }),
            TransportKind::StreamableHttp => Ok(Transport::StreamableHttp {
                url: required(&self.mcp_url, "mcp_url")?.to_string(),
            }),
        }
    }

    /// Build the per-query model settings.
    pub fn settings(&self) -> Result<QuerySettings, ConfigError> {
        Ok(QuerySettings::new(required(&self.model, "model")?)
            .with_max_tokens(self.max_tokens)
            .with_follow_up(self.follow_up))
    }

    /// Build the authentication from config.
    pub fn auth(&self) -> OpenAiAuth {
        OpenAiAuth::from_key(self.api_key.as_deref())
    }

    /// Build the model backend.
    pub fn backend(&self) -> Result<OpenAiBackend, ConfigError> {
        let base_url = required(&self.base_url, "base_url")?;
        Ok(OpenAiBackend::builder(base_url, self.auth()).build())
    }
}

fn required<'a>(value: &'a Option<String>, key: &'static str) -> Result<&'a str, ConfigError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key)),
    }
}

/// Pick the interpreter for a server script by its extension.
fn script_interpreter(script: &str) -> Result<&'static str, ConfigError> {
    if script.ends_with(".py") {
        Ok("python")
    } else if script.ends_with(".js") {
        Ok("node")
    } else {
        Err(ConfigError::UnsupportedScript(script.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid mcp_type '{0}': expected stdio, sse or streamablehttp")]
    InvalidTransport(String),

    #[error("server script must be a .py or .js file: {0}")]
    UnsupportedScript(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_python_script() {
        let config = Config::parse(
            r#"
            mcp_type = "stdio"
            server_script_path = "servers/time.py"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.transport().unwrap(),
            Transport::Stdio {
                command: "python".into(),
                args: vec!["servers/time.py".into()],
            }
        );
    }

    #[test]
    fn stdio_node_script() {
        let config = Config::parse(
            r#"
            mcp_type = "stdio"
            server_script_path = "build/index.js"
            "#,
        )
        .unwrap();
        let Transport::Stdio { command, .. } = config.transport().unwrap() else {
            panic!("expected stdio transport");
        };
        assert_eq!(command, "node");
    }

    #[test]
    fn stdio_rejects_other_scripts() {
        let config = Config::parse(
            r#"
            mcp_type = "stdio"
            server_script_path = "server.rb"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.transport(),
            Err(ConfigError::UnsupportedScript(_))
        ));
    }

    #[test]
    fn stdio_requires_script_path() {
        let config = Config::parse(r#"mcp_type = "stdio""#).unwrap();
        assert!(matches!(
            config.transport(),
            Err(ConfigError::Missing("server_script_path"))
        ));
    }

    #[test]
    fn http_transports_use_url() {
        let config = Config::parse(
            r#"
            mcp_type = "sse"
            mcp_url = "http://localhost:8000/sse"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.transport().unwrap(),
            Transport::Sse {
                url: "http://localhost:8000/sse".into()
            }
        );

        let config = Config::parse(
            r#"
            mcp_type = "streamablehttp"
            mcp_url = "http://localhost:8000/mcp"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.transport().unwrap(),
            Transport::StreamableHttp {
                url: "http://localhost:8000/mcp".into()
            }
        );
    }

    #[test]
    fn http_transport_requires_url() {
        let config = Config::parse(r#"mcp_type = "streamablehttp""#).unwrap();
        assert!(matches!(
            config.transport(),
            Err(ConfigError::Missing("mcp_url"))
        ));
    }

    #[test]
    fn unknown_transport_is_rejected() {
        let config = Config::parse(r#"mcp_type = "websocket""#).unwrap();
        assert!(matches!(
            config.transport(),
            Err(ConfigError::InvalidTransport(ref kind)) if kind == "websocket"
        ));
        assert!(matches!(
            Config::default().transport(),
            Err(ConfigError::Missing("mcp_type"))
        ));
    }

    #[test]
    fn settings_carry_model_and_budget() {
        let config = Config::parse(
            r#"
            model = "qwen2.5"
            max_tokens = 1024
            follow_up = "after_tool_calls"
            "#,
        )
        .unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.model, "qwen2.5");
        assert_eq!(settings.effective_max_tokens(), 1024);
        assert_eq!(settings.follow_up, FollowUp::AfterToolCalls);
    }

    #[test]
    fn settings_default_budget_and_follow_up() {
        let config = Config::parse(r#"model = "qwen2.5""#).unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.effective_max_tokens(), runtime::DEFAULT_MAX_TOKENS);
        assert_eq!(settings.follow_up, FollowUp::Always);
    }

    #[test]
    fn settings_require_model() {
        assert!(matches!(
            Config::default().settings(),
            Err(ConfigError::Missing("model"))
        ));
    }

    #[test]
    fn missing_or_empty_key_uses_placeholder_endpoint() {
        for toml in [
            r#"base_url = "http://localhost:11434""#,
            "base_url = \"http://localhost:11434\"\napi_key = \"\"",
        ] {
            let config = Config::parse(toml).unwrap();
            assert_eq!(config.auth(), OpenAiAuth::Placeholder);
            assert_eq!(
                config.backend().unwrap().endpoint(),
                "http://localhost:11434/v1/chat/completions"
            );
        }
    }

    #[test]
    fn api_key_keeps_base_url() {
        let config = Config::parse(
            r#"
            base_url = "https://api.example.com/v1"
            api_key = "sk-test"
            "#,
        )
        .unwrap();
        assert_eq!(config.auth(), OpenAiAuth::ApiKey("sk-test".into()));
        assert_eq!(
            config.backend().unwrap().endpoint(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn invalid_follow_up_fails_to_parse() {
        assert!(matches!(
            Config::parse(r#"follow_up = "sometimes""#),
            Err(ConfigError::Parse(_))
        ));
    }
}
