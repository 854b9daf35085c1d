//! MCP server implementation using rmcp over stdio transport.
//!
//! Provides the 10 decompiler tools that Claude (or any MCP client) can
//! invoke to browse classes, methods, fields, inheritance and xrefs of an
//! APK loaded in a running JADX instance.

use std::collections::BTreeSet;
use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    Annotated, CallToolRequestParams, CallToolResult, GetPromptRequestParams,
    GetPromptResult, ListPromptsResult, ListResourcesResult, ListToolsResult,
    PaginatedRequestParams, Prompt, PromptArgument, PromptMessage, PromptMessageRole, RawResource,
    ReadResourceRequestParams, ReadResourceResult, ResourceContents, ServerCapabilities,
    ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::Deserialize;
use tracing::info;

use super::dispatch::Dispatcher;
use super::registry::{self, OperationDescriptor};
use crate::client::JadxClient;
use crate::config::JadxMcpConfig;
use crate::error::{ClientError, ToolError};

const CONFIG_RESOURCE_URI: &str = "jadx://config";

// ---------------------------------------------------------------------------
// Server struct
// ---------------------------------------------------------------------------

/// JADX MCP server.
///
/// Holds no mutable state: the dispatcher's client and the config are
/// fixed at startup and shared by every clone rmcp makes.
#[derive(Debug, Clone)]
pub struct JadxMcpServer {
    dispatcher: Dispatcher,
    config: Arc<JadxMcpConfig>,
}

impl JadxMcpServer {
    /// Create a server talking to the decompiler named in `config`.
    pub fn new(config: JadxMcpConfig) -> Result<Self, ClientError> {
        let client = JadxClient::new(config.client_settings())?;
        Ok(Self::with_dispatcher(Dispatcher::new(client), config))
    }

    pub fn with_dispatcher(dispatcher: Dispatcher, config: JadxMcpConfig) -> Self {
        Self {
            dispatcher,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &JadxMcpConfig {
        &self.config
    }

    /// Whether a tool is visible and callable under the current config.
    pub fn is_tool_enabled(&self, name: &str) -> bool {
        registry::get_operation(name).is_some_and(|op| registry::is_enabled(&self.config, op))
    }

    /// Tool definitions visible to clients, in catalogue order.
    pub fn visible_tools(&self) -> Vec<Tool> {
        let router = Self::tool_router();
        let all = router.list_all();
        registry::OPERATIONS
            .iter()
            .filter(|op| registry::is_enabled(&self.config, op))
            .filter_map(|op| all.iter().find(|t| t.name == op.name).cloned())
            .collect()
    }

    async fn invoke(
        &self,
        op: &OperationDescriptor,
        args: &[&str],
    ) -> Result<CallToolResult, McpError> {
        Ok(self.dispatcher.run(op, args).await.into_call_tool_result())
    }

    fn status_json(&self) -> serde_json::Value {
        let enabled: BTreeSet<&str> = registry::enabled_operations(&self.config)
            .into_iter()
            .collect();
        serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "baseUrl": self.dispatcher.client().base_url(),
            "timeoutSecs": self.dispatcher.client().timeout().as_secs(),
            "enabledTools": enabled,
        })
    }
}

// ---------------------------------------------------------------------------
// Tool parameter structs
// ---------------------------------------------------------------------------

#[derive(Deserialize, schemars::JsonSchema)]
pub(crate) struct ClassMethodParams {
    #[schemars(description = "Fully qualified class name, e.g. com.example.MainActivity")]
    pub class_name: String,
    #[schemars(description = "Method name")]
    pub method_name: String,
}

#[derive(Deserialize, schemars::JsonSchema)]
pub(crate) struct ClassParams {
    #[schemars(description = "Fully qualified class name, e.g. com.example.MainActivity")]
    pub class_name: String,
}

#[derive(Deserialize, schemars::JsonSchema)]
pub(crate) struct MethodNameParams {
    #[schemars(description = "Method name")]
    pub method_name: String,
}

#[derive(Deserialize, schemars::JsonSchema)]
pub(crate) struct InterfaceParams {
    #[schemars(description = "Fully qualified interface name")]
    pub interface_name: String,
}

// ---------------------------------------------------------------------------
// Tool implementations
// ---------------------------------------------------------------------------

#[tool_router]
impl JadxMcpServer {
    #[tool(
        name = "get_method_code",
        description = "Retrieve the source code of a specific method from a class."
    )]
    async fn get_method_code(
        &self,
        Parameters(p): Parameters<ClassMethodParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_METHOD_CODE, &[&p.class_name, &p.method_name])
            .await
    }

    #[tool(
        name = "get_all_classes",
        description = "Get a complete list of all classes in the decompiled project."
    )]
    async fn get_all_classes(&self) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_ALL_CLASSES, &[]).await
    }

    #[tool(
        name = "get_class_code",
        description = "Retrieve the complete Java source code of a specified class."
    )]
    async fn get_class_code(
        &self,
        Parameters(p): Parameters<ClassParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_CLASS_CODE, &[&p.class_name]).await
    }

    #[tool(
        name = "search_method_by_name",
        description = "Search for methods with a specific name across all classes in the project."
    )]
    async fn search_method_by_name(
        &self,
        Parameters(p): Parameters<MethodNameParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::SEARCH_METHOD_BY_NAME, &[&p.method_name])
            .await
    }

    #[tool(
        name = "get_methods_of_class",
        description = "List all methods defined in a specific class."
    )]
    async fn get_methods_of_class(
        &self,
        Parameters(p): Parameters<ClassParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_METHODS_OF_CLASS, &[&p.class_name])
            .await
    }

    #[tool(
        name = "get_fields_of_class",
        description = "List all fields and their types defined in a specific class."
    )]
    async fn get_fields_of_class(
        &self,
        Parameters(p): Parameters<ClassParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_FIELDS_OF_CLASS, &[&p.class_name])
            .await
    }

    #[tool(
        name = "get_smali_of_class",
        description = "Retrieve the Smali (disassembled Dalvik bytecode) representation of a class."
    )]
    async fn get_smali_of_class(
        &self,
        Parameters(p): Parameters<ClassParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_SMALI_OF_CLASS, &[&p.class_name])
            .await
    }

    #[tool(
        name = "get_implementation_of_interface",
        description = "Find all classes that implement a specific interface."
    )]
    async fn get_implementation_of_interface(
        &self,
        Parameters(p): Parameters<InterfaceParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            &registry::GET_IMPLEMENTATION_OF_INTERFACE,
            &[&p.interface_name],
        )
        .await
    }

    #[tool(
        name = "get_superclasses_of_class",
        description = "Get the inheritance hierarchy (parent classes) of a specific class."
    )]
    async fn get_superclasses_of_class(
        &self,
        Parameters(p): Parameters<ClassParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(&registry::GET_SUPERCLASSES_OF_CLASS, &[&p.class_name])
            .await
    }

    #[tool(
        name = "find_xref_of_method",
        description = "Find all cross-references (usages) of a specific method."
    )]
    async fn find_xref_of_method(
        &self,
        Parameters(p): Parameters<ClassMethodParams>,
    ) -> Result<CallToolResult, McpError> {
        self.invoke(
            &registry::FIND_XREF_OF_METHOD,
            &[&p.class_name, &p.method_name],
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// ServerHandler impl — manual list_tools/call_tool for config filtering
// ---------------------------------------------------------------------------

impl ServerHandler for JadxMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "JADX MCP server: query a decompiled Android application loaded in a running \
                 JADX instance. Start with get_all_classes or search_method_by_name, then use \
                 get_class_code / get_method_code for source, get_smali_of_class for bytecode, \
                 and find_xref_of_method, get_superclasses_of_class or \
                 get_implementation_of_interface to navigate. Results starting with \"Error: \" \
                 mean the decompiler could not be reached or rejected the request."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: rmcp::model::Implementation {
                name: "jadx-mcp".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListResourcesResult, McpError>> + Send + '_ {
        let resources = vec![Annotated::new(
            RawResource {
                uri: CONFIG_RESOURCE_URI.into(),
                name: "Server Configuration".into(),
                title: None,
                description: Some(
                    "Decompiler base URL, request timeout and the tools enabled in this session."
                        .into(),
                ),
                mime_type: Some("application/json".into()),
                size: None,
                icons: None,
                meta: None,
            },
            None,
        )];
        std::future::ready(Ok(ListResourcesResult {
            meta: None,
            next_cursor: None,
            resources,
        }))
    }

    fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ReadResourceResult, McpError>> + Send + '_ {
        let result = match request.uri.as_str() {
            CONFIG_RESOURCE_URI => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(
                    serde_json::to_string_pretty(&self.status_json()).unwrap_or_default(),
                    CONFIG_RESOURCE_URI,
                )],
            }),
            uri => Err(McpError::resource_not_found(
                format!("Unknown resource: {uri}"),
                None,
            )),
        };
        std::future::ready(result)
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        let prompts = vec![Prompt::new(
            "explain-class",
            Some("Walk through a decompiled class: its source, members, parents and who uses it."),
            Some(vec![PromptArgument {
                name: "class_name".into(),
                title: None,
                description: Some("Fully qualified class name to explain".into()),
                required: Some(true),
            }]),
        )];
        std::future::ready(Ok(ListPromptsResult {
            meta: None,
            next_cursor: None,
            prompts,
        }))
    }

    fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<GetPromptResult, McpError>> + Send + '_ {
        let args = request.arguments.unwrap_or_default();

        let result = match request.name.as_str() {
            "explain-class" => {
                let class_name = args
                    .get("class_name")
                    .and_then(|v| v.as_str())
                    .unwrap_or("unknown");
                Ok(GetPromptResult {
                    description: Some("Class walkthrough workflow".into()),
                    messages: vec![PromptMessage::new_text(
                        PromptMessageRole::User,
                        explain_class_prompt(class_name),
                    )],
                })
            }
            name => Err(McpError::invalid_params(
                format!("Unknown prompt: {name}"),
                None,
            )),
        };

        std::future::ready(result)
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: self.visible_tools(),
        }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        // Unknown names fall through to the router, which reports them.
        if registry::get_operation(request.name.as_ref()).is_some()
            && !self.is_tool_enabled(request.name.as_ref())
        {
            return Ok(ToolError::Disabled(request.name.to_string()).to_tool_result());
        }

        let tool_context =
            rmcp::handler::server::tool::ToolCallContext::new(self, request, context);
        Self::tool_router().call(tool_context).await
    }
}

fn explain_class_prompt(class_name: &str) -> String {
    format!(
        "Explain the class `{class_name}` from the decompiled application. Follow these steps:\n\n\
         1. Call `get_class_code` with class_name=\"{class_name}\" to read its Java source.\n\
         2. Call `get_methods_of_class` and `get_fields_of_class` with class_name=\"{class_name}\" to list its members.\n\
         3. Call `get_superclasses_of_class` with class_name=\"{class_name}\" to see what it inherits from.\n\
         4. For the most interesting methods, call `find_xref_of_method` to see where they are used.\n\
         5. If the Java output looks wrong or incomplete, fall back to `get_smali_of_class`.\n\
         6. Summarize:\n\
            - What the class is responsible for\n\
            - Its key methods and state\n\
            - How it fits into the rest of the application\n\
            - Anything security-relevant (crypto, network, storage, IPC)"
    )
}

// ---------------------------------------------------------------------------
// Public entry point: run the MCP server over stdio
// ---------------------------------------------------------------------------

/// Start the MCP server on stdin/stdout.
///
/// This blocks until the client disconnects or Ctrl-C is received.
pub async fn run_server(config: JadxMcpConfig) -> Result<(), Box<dyn std::error::Error>> {
    let server = JadxMcpServer::new(config)?;
    info!(
        base_url = server.dispatcher.client().base_url(),
        tools = server.visible_tools().len(),
        "starting JADX MCP server on stdio"
    );

    let transport = rmcp::transport::io::stdio();
    let running = server.serve(transport).await.inspect_err(|e| {
        tracing::error!("MCP server error: {}", e);
    })?;

    tokio::select! {
        reason = running.waiting() => {
            info!(?reason, "MCP client disconnected");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down MCP server");
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
