//! Command-line entry points.
//!
//! With no action flag the binary serves MCP over stdio. `--list-tools`
//! prints the catalogue and `--call` runs one operation synchronously,
//! which is handy for checking that the decompiler is reachable.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::client::JadxClient;
use crate::config::{load_config, ConfigOverrides, JadxMcpConfig};
use crate::error::{ConfigError, ToolError};
use crate::mcp::dispatch::{Dispatcher, ToolResponse};
use crate::mcp::registry::{self, ToolCategory, OPERATIONS};

#[derive(Parser, Debug)]
#[command(name = "jadx-mcp", version, about = "MCP server for the JADX decompiler")]
pub struct Cli {
    /// Base URI of the JADX HTTP API (default http://127.0.0.1:8080/api/jadx)
    #[arg(value_name = "BASE_URI")]
    pub base_uri: Option<String>,

    /// Extra YAML config file, applied after user and project config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Print the tool catalogue as JSON and exit
    #[arg(long, conflicts_with = "call")]
    pub list_tools: bool,

    /// Invoke one tool and print its result
    #[arg(long, value_name = "TOOL")]
    pub call: Option<String>,

    /// Tool argument for --call (repeatable)
    #[arg(long = "arg", value_name = "KEY=VALUE", value_parser = parse_key_value, requires = "call")]
    pub args: Vec<(String, String)>,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Serve,
    ListTools,
    Call {
        tool: String,
        args: HashMap<String, String>,
    },
}

impl Cli {
    pub fn action(&self) -> Action {
        if self.list_tools {
            return Action::ListTools;
        }
        match &self.call {
            Some(tool) => Action::Call {
                tool: tool.clone(),
                args: self.args.iter().cloned().collect(),
            },
            None => Action::Serve,
        }
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_uri.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Resolve the effective config, using the working directory as the
    /// project root.
    pub fn load_config(&self) -> Result<JadxMcpConfig, ConfigError> {
        let project_root = std::env::current_dir().ok();
        load_config(
            self.config.as_deref(),
            project_root.as_deref(),
            &self.overrides(),
        )
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// The catalogue as JSON, with each tool's enabled state under `config`.
pub fn catalogue_json(config: &JadxMcpConfig) -> serde_json::Value {
    let tools: Vec<serde_json::Value> = OPERATIONS
        .iter()
        .map(|op| {
            let mut entry = serde_json::to_value(op).unwrap_or_default();
            if let Some(obj) = entry.as_object_mut() {
                obj.insert(
                    "enabled".into(),
                    serde_json::Value::Bool(registry::is_enabled(config, op)),
                );
            }
            entry
        })
        .collect();
    let categories: Vec<serde_json::Value> = ToolCategory::all()
        .iter()
        .map(|c| {
            let members: Vec<&str> = registry::operations_by_category(*c)
                .map(|op| op.name)
                .collect();
            serde_json::json!({
                "name": c.as_str(),
                "description": c.description(),
                "tools": members,
            })
        })
        .collect();
    serde_json::json!({ "categories": categories, "tools": tools })
}

/// Run one tool through the blocking client.
///
/// Must not be called from inside an async runtime.
pub fn call_once(
    config: &JadxMcpConfig,
    tool: &str,
    args: &HashMap<String, String>,
) -> Result<ToolResponse, ToolError> {
    let (op, values) = Dispatcher::resolve(tool, args)?;
    if !registry::is_enabled(config, op) {
        return Err(ToolError::Disabled(op.name.to_string()));
    }
    let dispatcher = Dispatcher::new(JadxClient::new(config.client_settings())?);
    Ok(dispatcher.run_blocking(op, &values))
}

/// Execute the parsed command line. Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = cli.load_config()?;
    info!(
        base_url = %config.server.base_url,
        timeout_secs = config.server.timeout_secs,
        "configuration loaded"
    );

    match cli.action() {
        Action::ListTools => {
            println!("{}", serde_json::to_string_pretty(&catalogue_json(&config))?);
            Ok(0)
        }
        Action::Call { tool, args } => match call_once(&config, &tool, &args) {
            Ok(response) => {
                println!("{}", response.to_plain_text());
                Ok(if response.is_error { 1 } else { 0 })
            }
            Err(e) => {
                eprintln!("{e}");
                Ok(1)
            }
        },
        Action::Serve => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(crate::mcp::server::run_server(config))?;
            Ok(0)
        }
    }
}
