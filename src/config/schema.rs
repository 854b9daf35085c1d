//! Configuration data structures for jadx-mcp.
//!
//! Defines the YAML config format: decompiler connection settings plus
//! per-tool and per-category toggles. Designed for multi-source loading
//! with serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::client::{ClientSettings, DEFAULT_TIMEOUT_SECS};

/// Decompiler API used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api/jadx";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for jadx-mcp.
///
/// Loaded from YAML files, environment variables, and CLI flags.
/// Multiple sources are merged with well-defined priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JadxMcpConfig {
    /// Config format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Decompiler connection.
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-tool and per-category overrides.
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Default for JadxMcpConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl JadxMcpConfig {
    /// Settings for the decompiler HTTP client.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(
            self.server.base_url.clone(),
            Duration::from_secs(self.server.timeout_secs),
        )
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// Where the decompiler's HTTP API lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URI of the decompiler API; trailing slashes are stripped.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// ToolsConfig
// ---------------------------------------------------------------------------

/// Per-tool and per-category configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Individual tool overrides (enable/disable specific tools).
    #[serde(default)]
    pub overrides: HashMap<String, ToolOverride>,

    /// Category-level toggles keyed by category name (e.g. `source`).
    #[serde(default)]
    pub categories: HashMap<String, CategoryConfig>,
}

/// Override the enabled state of a single tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOverride {
    /// Whether this tool is enabled.
    pub enabled: bool,

    /// Human-readable reason for the override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ToolOverride {
    /// Create a disabled override with a reason.
    pub fn disabled(reason: impl Into<String>) -> Self {
        Self {
            enabled: false,
            reason: Some(reason.into()),
        }
    }

    /// Create an enabled override.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            reason: None,
        }
    }
}

/// Enable or disable an entire tool category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
