//! Configuration: YAML schema and multi-source loader.

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigOverrides};
pub use schema::{JadxMcpConfig, DEFAULT_BASE_URL};

/// Strip every trailing `/` from a base URI.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
