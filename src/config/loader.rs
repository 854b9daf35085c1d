//! Multi-source config loading.
//!
//! Priority, lowest first: built-in defaults, user config
//! (`<config dir>/jadx-mcp/config.yaml`), project `.jadx-mcp.yaml`, an
//! explicit `--config` file, environment variables, command-line flags.
//! YAML layers are deep-merged by mapping key, so a later file only needs
//! the keys it changes.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::normalize_base_url;
use super::schema::JadxMcpConfig;
use crate::error::ConfigError;

/// Project-local config file name.
pub const PROJECT_CONFIG_FILE: &str = ".jadx-mcp.yaml";
/// Overrides `server.base_url`.
pub const ENV_BASE_URL: &str = "JADX_MCP_BASE_URL";
/// Overrides `server.timeout_secs`.
pub const ENV_TIMEOUT_SECS: &str = "JADX_MCP_TIMEOUT_SECS";

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Load the effective configuration from all sources.
///
/// An explicit config path must exist; user and project files are optional.
pub fn load_config(
    explicit: Option<&Path>,
    project_root: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<JadxMcpConfig, ConfigError> {
    let mut files: Vec<(PathBuf, bool)> = Vec::new();
    if let Some(user) = user_config_path() {
        files.push((user, false));
    }
    if let Some(root) = project_root {
        files.push((root.join(PROJECT_CONFIG_FILE), false));
    }
    if let Some(path) = explicit {
        files.push((path.to_path_buf(), true));
    }
    load_config_with(&files, |name| std::env::var(name).ok(), overrides)
}

/// Load from an explicit list of `(path, required)` files and an
/// environment lookup. Used by [`load_config`] and by tests.
pub fn load_config_with<F>(
    files: &[(PathBuf, bool)],
    env: F,
    overrides: &ConfigOverrides,
) -> Result<JadxMcpConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = Value::Mapping(Mapping::new());
    for (path, required) in files {
        if let Some(layer) = read_layer(path, *required)? {
            debug!(path = %path.display(), "loaded config layer");
            merge(&mut merged, layer);
        }
    }

    let mut config: JadxMcpConfig =
        serde_yaml::from_value(merged).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<merged config>"),
            source,
        })?;

    apply_env(&mut config, env)?;

    if let Some(url) = &overrides.base_url {
        config.server.base_url = url.clone();
    }
    if let Some(secs) = overrides.timeout_secs {
        config.server.timeout_secs = secs;
    }
    config.server.base_url = normalize_base_url(&config.server.base_url);
    Ok(config)
}

/// `<config dir>/jadx-mcp/config.yaml`, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "jadx-mcp").map(|d| d.config_dir().join("config.yaml"))
}

fn read_layer(path: &Path, required: bool) -> Result<Option<Value>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let parse_err = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };
    let value: Value = serde_yaml::from_str(&text).map_err(parse_err)?;
    if value.is_null() {
        return Ok(None);
    }
    // Validate the layer on its own so type errors point at the right file.
    serde_yaml::from_value::<JadxMcpConfig>(value.clone()).map_err(parse_err)?;
    Ok(Some(value))
}

/// Deep-merge `overlay` into `base`; mappings merge by key, anything else
/// is replaced.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn apply_env<F>(config: &mut JadxMcpConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = env(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.server.base_url = url;
    }
    if let Some(raw) = env(ENV_TIMEOUT_SECS) {
        config.server.timeout_secs = raw
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or_else(|| ConfigError::InvalidEnv {
                name: ENV_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
    }
    Ok(())
}
