//! jadx-mcp — MCP bridge to the JADX decompiler.
//!
//! Exposes a fixed catalogue of decompiler queries (classes, methods,
//! fields, Smali, inheritance, cross-references) as MCP tools, forwarding
//! each call to the HTTP API of a running JADX instance.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod mcp;
pub mod observability;
