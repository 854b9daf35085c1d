//! Error types for the JADX MCP server.
//!
//! Transport failures are typed here and only flattened into the in-band
//! `"Error: ..."` string at the tool boundary. Protocol errors (unknown tool
//! name over MCP, malformed arguments) are handled by rmcp itself.

use std::path::PathBuf;

use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

/// Prefix of every in-band failure string returned to MCP clients.
pub const ERROR_PREFIX: &str = "Error: ";

/// Maximum number of response body characters kept in a status error.
const MAX_DETAIL_CHARS: usize = 200;

/// Failure of a single decompiler HTTP call.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{}", transport_detail(.0))]
    Transport(#[source] reqwest::Error),

    #[error("HTTP status {status} for url '{url}'{detail}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        detail: String,
    },

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl ClientError {
    /// Build a status error, keeping a bounded excerpt of the response body.
    pub fn status(status: reqwest::StatusCode, url: impl Into<String>, body: &str) -> Self {
        let body = body.trim();
        let detail = if body.is_empty() {
            String::new()
        } else {
            let excerpt: String = body.chars().take(MAX_DETAIL_CHARS).collect();
            format!(": {excerpt}")
        };
        ClientError::Status {
            status,
            url: url.into(),
            detail,
        }
    }

    /// Render the in-band sentinel string seen by MCP clients.
    pub fn sentinel(&self) -> String {
        let detail = self.to_string();
        if detail.is_empty() {
            format!("{ERROR_PREFIX}request failed")
        } else {
            format!("{ERROR_PREFIX}{detail}")
        }
    }
}

/// reqwest's Display omits the cause, so walk the source chain. Timeouts
/// always say so.
fn transport_detail(err: &reqwest::Error) -> String {
    let mut detail = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !detail.contains(&text) {
            detail.push_str(": ");
            detail.push_str(&text);
        }
        source = cause.source();
    }
    if err.is_timeout() && !detail.contains("timed out") {
        detail.push_str(" (timed out)");
    }
    detail
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: String, value: String },
}

/// Errors raised when a tool is invoked by name outside the rmcp router.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{tool}' requires argument '{param}'")]
    MissingArgument { tool: String, param: String },

    #[error("Tool '{0}' is disabled by configuration")]
    Disabled(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ToolError {
    /// Convert to MCP CallToolResult with is_error: true
    pub fn to_tool_result(&self) -> CallToolResult {
        CallToolResult::error(vec![Content::text(self.to_string())])
    }
}
