//! MCP (Model Context Protocol) server — exposes the gateway as an MCP
//! tool server.
//!
//! AI agents connect via stdio and request command execution; every
//! request funnels through the execution bridge and its validation gate.
//! Implements JSON-RPC 2.0 with the MCP tool protocol surface:
//! `initialize`, `tools/list`, `tools/call`, `notifications/initialized`.

use std::io::{self, BufRead, Write};

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::ExecutionBridge;
use crate::error::{Error, Result};
use ibmi_gateway_core::{CompileRequest, Language};

// ---------------------------------------------------------------------------
// JSON-RPC types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

// ---------------------------------------------------------------------------
// MCP protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
struct ToolsCapability {}

#[derive(Debug, Serialize)]
struct ServerInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct ToolDefinition {
    name: String,
    description: String,
    #[serde(rename = "inputSchema")]
    input_schema: Value,
}

#[derive(Debug, Serialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Serialize)]
struct ToolCallResult {
    content: Vec<ToolContent>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    is_error: bool,
}

#[derive(Debug, Serialize)]
struct ToolContent {
    #[serde(rename = "type")]
    content_type: String,
    text: String,
}

// ---------------------------------------------------------------------------
// McpServer
// ---------------------------------------------------------------------------

/// The MCP server holds the execution bridge and processes JSON-RPC
/// requests one line at a time.
pub struct McpServer<'a> {
    bridge: &'a ExecutionBridge<'a>,
    session_id: String,
}

impl<'a> McpServer<'a> {
    /// Create a new MCP server instance.
    pub fn new(bridge: &'a ExecutionBridge<'a>, session_id: String) -> Self {
        Self { bridge, session_id }
    }

    /// Run the stdio JSON-RPC loop. Reads requests from stdin, writes
    /// responses to stdout.
    ///
    /// # Errors
    /// Returns an error if stdin/stdout operations fail.
    pub fn run_stdio(&self) -> Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(&line) {
                let json = serde_json::to_string(&response)?;
                writeln!(stdout, "{json}")?;
                stdout.flush()?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC line, returning a response (or None for
    /// notifications).
    fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                return Some(JsonRpcResponse {
                    jsonrpc: "2.0".into(),
                    id: None,
                    result: None,
                    error: Some(JsonRpcError {
                        code: -32700,
                        message: format!("Parse error: {e}"),
                    }),
                });
            }
        };

        self.handle_request(&request)
    }

    /// Handle a parsed JSON-RPC request.
    fn handle_request(&self, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        match request.method.as_str() {
            "initialize" => Some(self.handle_initialize(request)),
            "notifications/initialized" => None, // notification, no response
            "tools/list" => Some(self.handle_tools_list(request)),
            "tools/call" => Some(self.handle_tools_call(request)),
            _ => Some(JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: request.id.clone(),
                result: None,
                error: Some(JsonRpcError {
                    code: -32601,
                    message: format!("Method not found: {}", request.method),
                }),
            }),
        }
    }

    #[allow(clippy::unused_self)]
    fn handle_initialize(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: "2024-11-05".into(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {},
            },
            server_info: ServerInfo {
                name: "ibmi-gateway".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
        };

        JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: request.id.clone(),
            result: Some(serde_json::to_value(result).unwrap()),
            error: None,
        }
    }

    #[allow(clippy::unused_self)]
    fn handle_tools_list(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let compile_schema = serde_json::json!({
            "type": "object",
            "properties": {
                "source_library": {
                    "type": "string",
                    "description": "Library holding the source file (e.g. 'DEVLIB')"
                },
                "source_file": {
                    "type": "string",
                    "description": "Source physical file (e.g. 'QRPGLESRC')"
                },
                "member": {
                    "type": "string",
                    "description": "Member to compile"
                },
                "target_library": {
                    "type": "string",
                    "description": "Target library (defaults to source_library)"
                },
                "program_name": {
                    "type": "string",
                    "description": "Compiled program name (defaults to member)"
                }
            },
            "required": ["source_library", "source_file", "member"]
        });

        let tools = vec![
            ToolDefinition {
                name: "run_command".into(),
                description: "Execute a CL command or read-only SQL query on the IBM i \
                    system. Only allowlisted commands (DSP*, WRK*, RTV*, SELECT and the \
                    compile verbs) are executed."
                    .into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "command": {
                            "type": "string",
                            "description": "CL command or SQL query (e.g. 'WRKACTJOB', 'SELECT * FROM LIB.TABLE')"
                        }
                    },
                    "required": ["command"]
                }),
            },
            ToolDefinition {
                name: "compile_cl_program".into(),
                description: "Compile a CL program with debug views enabled.".into(),
                input_schema: compile_schema.clone(),
            },
            ToolDefinition {
                name: "compile_rpg_program".into(),
                description: "Compile an RPG/RPGLE program with debug views enabled.".into(),
                input_schema: compile_schema.clone(),
            },
            ToolDefinition {
                name: "compile_cobol_program".into(),
                description: "Compile a COBOL program with debug views enabled.".into(),
                input_schema: compile_schema,
            },
            ToolDefinition {
                name: "list_library_objects".into(),
                description: "List objects in a library (WRKOBJPDM equivalent), with name, \
                    type, text and creation date."
                    .into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "library": {
                            "type": "string",
                            "description": "Library to inspect"
                        },
                        "object_type": {
                            "type": "string",
                            "description": "Object type filter (*ALL, *PGM, *FILE, *DTAARA, ...)"
                        }
                    },
                    "required": ["library"]
                }),
            },
            ToolDefinition {
                name: "list_source_members".into(),
                description: "List members of a source file (WRKMBRPDM equivalent), most \
                    recently changed first."
                    .into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "library": {
                            "type": "string",
                            "description": "Library holding the source file"
                        },
                        "source_file": {
                            "type": "string",
                            "description": "Source physical file (e.g. QRPGLESRC, QCBLLESRC)"
                        }
                    },
                    "required": ["library", "source_file"]
                }),
            },
            ToolDefinition {
                name: "read_source_member".into(),
                description: "Read the full source of one member, with sequence numbers."
                    .into(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "library": {
                            "type": "string",
                            "description": "Library holding the source file"
                        },
                        "source_file": {
                            "type": "string",
                            "description": "Source physical file"
                        },
                        "member": {
                            "type": "string",
                            "description": "Member to read"
                        }
                    },
                    "required": ["library", "source_file", "member"]
                }),
            },
        ];

        let result = ToolsListResult { tools };

        JsonRpcResponse {
            jsonrpc: "2.0".into(),
            id: request.id.clone(),
            result: Some(serde_json::to_value(result).unwrap()),
            error: None,
        }
    }

    fn handle_tools_call(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let params = request.params.as_ref().and_then(|p| p.as_object());
        let tool_name = params
            .and_then(|p| p.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("");
        let arguments = params
            .and_then(|p| p.get("arguments"))
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        let result = match tool_name {
            "run_command" => self.tool_run_command(&arguments),
            "compile_cl_program" => self.tool_compile(&arguments, Language::Cl),
            "compile_rpg_program" => self.tool_compile(&arguments, Language::Rpg),
            "compile_cobol_program" => self.tool_compile(&arguments, Language::Cobol),
            "list_library_objects" => self.tool_list_library_objects(&arguments),
            "list_source_members" => self.tool_list_source_members(&arguments),
            "read_source_member" => self.tool_read_source_member(&arguments),
            _ => Err(Error::Mcp(format!("Unknown tool: {tool_name}"))),
        };

        match result {
            Ok(text) => JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: request.id.clone(),
                result: Some(
                    serde_json::to_value(ToolCallResult {
                        content: vec![ToolContent {
                            content_type: "text".into(),
                            text,
                        }],
                        is_error: false,
                    })
                    .unwrap(),
                ),
                error: None,
            },
            Err(e) => JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: request.id.clone(),
                result: Some(
                    serde_json::to_value(ToolCallResult {
                        content: vec![ToolContent {
                            content_type: "text".into(),
                            text: format!("Error: {e}"),
                        }],
                        is_error: true,
                    })
                    .unwrap(),
                ),
                error: None,
            },
        }
    }

    // -----------------------------------------------------------------------
    // Tool implementations
    // -----------------------------------------------------------------------

    fn tool_run_command(&self, args: &Value) -> Result<String> {
        let command = required_str(args, "command")?;
        Ok(self.bridge.handle_to_text(command))
    }

    fn tool_compile(&self, args: &Value, language: Language) -> Result<String> {
        let request = CompileRequest {
            language,
            source_library: required_str(args, "source_library")?.to_string(),
            source_file: required_str(args, "source_file")?.to_string(),
            member: required_str(args, "member")?.to_string(),
            target_library: optional_str(args, "target_library"),
            program_name: optional_str(args, "program_name"),
        };
        Ok(self.bridge.compile_program(&request))
    }

    fn tool_list_library_objects(&self, args: &Value) -> Result<String> {
        let library = required_str(args, "library")?;
        let object_type = args
            .get("object_type")
            .and_then(Value::as_str)
            .unwrap_or("*ALL");
        Ok(self.bridge.list_library_objects(library, object_type))
    }

    fn tool_list_source_members(&self, args: &Value) -> Result<String> {
        let library = required_str(args, "library")?;
        let source_file = required_str(args, "source_file")?;
        Ok(self.bridge.list_source_members(library, source_file))
    }

    fn tool_read_source_member(&self, args: &Value) -> Result<String> {
        let library = required_str(args, "library")?;
        let source_file = required_str(args, "source_file")?;
        let member = required_str(args, "member")?;
        Ok(self.bridge.read_source_member(library, source_file, member))
    }

    /// Session identifier reported in logs for correlation.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

fn required_str<'v>(args: &'v Value, key: &str) -> Result<&'v str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Mcp(format!("Missing '{key}' parameter")))
}

fn optional_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
}
