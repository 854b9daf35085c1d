//! MCP server: Model Context Protocol front end to a running JADX decompiler.
//!
//! - [`registry`] — the static catalogue of the 10 decompiler operations
//! - [`dispatch`] — one operation, one HTTP request, one shaped response
//! - [`server`] — rmcp tool router and `ServerHandler` over stdio
//!
//! Also exposes the `jadx://config` resource and the `explain-class` prompt.

pub mod dispatch;
pub mod registry;
pub mod server;
