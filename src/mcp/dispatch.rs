//! Operation dispatch and response shaping.
//!
//! The [`Dispatcher`] turns an operation plus its argument values into one
//! decompiler request and applies the operation's [`Shape`] to the body.
//! Transport failures reach this layer as [`ClientError`] and leave it as
//! the in-band `"Error: ..."` string, with the MCP result flagged as an
//! error so clients need not pattern-match to detect them.

use std::collections::HashMap;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use tracing::debug;

use super::registry::{get_operation, OperationDescriptor};
use crate::client::JadxClient;
use crate::error::{ClientError, ToolError};

/// How a raw response body becomes a tool result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    /// Body returned verbatim (source code, Smali).
    Text,
    /// Body split into one entry per line.
    Lines,
}

impl Shape {
    /// Shape the outcome of one decompiler call.
    ///
    /// On failure a list-shaped operation yields a single entry holding the
    /// sentinel, matching what clients of the original tool set expect.
    pub fn apply(self, outcome: Result<String, ClientError>) -> ToolResponse {
        let (body, is_error) = match outcome {
            Ok(body) => (body, false),
            Err(e) => (e.sentinel(), true),
        };
        let output = match self {
            Shape::Text => ToolOutput::Text(body),
            Shape::Lines if is_error => ToolOutput::Lines(vec![body]),
            Shape::Lines => ToolOutput::Lines(split_lines(&body)),
        };
        ToolResponse { output, is_error }
    }
}

/// Split a body on line boundaries.
///
/// Boundaries are `\r\n` plus every single-character separator Python's
/// `str.splitlines` recognises: `\n`, `\r`, `\x0b`, `\x0c`, `\x1c`-`\x1e`,
/// `\u{85}`, `\u{2028}` and `\u{2029}`. A trailing boundary does not
/// produce an empty last entry, and an empty body yields no entries.
pub fn split_lines(body: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut rest = body;
    while !rest.is_empty() {
        match rest.char_indices().find(|(_, c)| is_line_break(*c)) {
            Some((idx, c)) => {
                lines.push(rest[..idx].to_string());
                let skip = if rest[idx..].starts_with("\r\n") { 2 } else { c.len_utf8() };
                rest = &rest[idx + skip..];
            }
            None => {
                lines.push(rest.to_string());
                break;
            }
        }
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Shaped result of one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutput {
    Text(String),
    Lines(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub output: ToolOutput,
    /// The decompiler call itself failed; the output holds the sentinel.
    pub is_error: bool,
}

impl ToolResponse {
    /// Convert to MCP CallToolResult.
    ///
    /// Text becomes one text item. Lines become one text item per line plus
    /// `{"result": [...]}` as structured content.
    pub fn into_call_tool_result(self) -> CallToolResult {
        let mut result = match self.output {
            ToolOutput::Text(text) => CallToolResult::success(vec![Content::text(text)]),
            ToolOutput::Lines(lines) => {
                let content = lines.iter().cloned().map(Content::text).collect();
                let mut result = CallToolResult::success(content);
                result.structured_content = Some(serde_json::json!({ "result": lines }));
                result
            }
        };
        result.is_error = Some(self.is_error);
        result
    }

    /// Render for a terminal: text verbatim, lines newline-joined.
    pub fn to_plain_text(&self) -> String {
        match &self.output {
            ToolOutput::Text(text) => text.clone(),
            ToolOutput::Lines(lines) => lines.join("\n"),
        }
    }
}

/// Runs catalogue operations against one decompiler.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: JadxClient,
}

impl Dispatcher {
    pub fn new(client: JadxClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &JadxClient {
        &self.client
    }

    /// Run an operation; `args` are positional, in `op.params` order.
    pub async fn run(&self, op: &OperationDescriptor, args: &[&str]) -> ToolResponse {
        let query = query_pairs(op, args);
        debug!(tool = op.name, endpoint = op.endpoint, "dispatching");
        let outcome = self.client.get(op.endpoint, &query).await;
        log_failure(op, &outcome);
        op.shape.apply(outcome)
    }

    /// Blocking variant of [`run`](Self::run); must not be called from
    /// inside an async runtime.
    pub fn run_blocking(&self, op: &OperationDescriptor, args: &[&str]) -> ToolResponse {
        let query = query_pairs(op, args);
        debug!(tool = op.name, endpoint = op.endpoint, "dispatching (blocking)");
        let outcome = self.client.get_blocking(op.endpoint, &query);
        log_failure(op, &outcome);
        op.shape.apply(outcome)
    }

    /// Resolve a tool by name and pull its arguments out of a map.
    pub fn resolve<'a>(
        name: &str,
        args: &'a HashMap<String, String>,
    ) -> Result<(&'static OperationDescriptor, Vec<&'a str>), ToolError> {
        let op = get_operation(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let values = op
            .params
            .iter()
            .map(|p| {
                args.get(p.name)
                    .map(String::as_str)
                    .ok_or_else(|| ToolError::MissingArgument {
                        tool: op.name.to_string(),
                        param: p.name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((op, values))
    }

    /// Run a tool by name with named arguments.
    pub async fn call_by_name(
        &self,
        name: &str,
        args: &HashMap<String, String>,
    ) -> Result<ToolResponse, ToolError> {
        let (op, values) = Self::resolve(name, args)?;
        Ok(self.run(op, &values).await)
    }
}

fn query_pairs<'a>(op: &OperationDescriptor, args: &[&'a str]) -> Vec<(&'static str, &'a str)> {
    debug_assert_eq!(op.params.len(), args.len(), "arity mismatch for {}", op.name);
    op.params
        .iter()
        .zip(args.iter().copied())
        .map(|(p, v)| (p.query_key, v))
        .collect()
}

fn log_failure(op: &OperationDescriptor, outcome: &Result<String, ClientError>) {
    if let Err(e) = outcome {
        tracing::warn!(tool = op.name, error = %e, "decompiler request failed");
    }
}
