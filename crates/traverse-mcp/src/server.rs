//! MCP Server
//!
//! Handles the MCP protocol over stdio, processing JSON-RPC 2.0 messages.
//! Each `tools/call` runs on its own task so validation proceeds concurrently;
//! engine access is still serialized by the executor. Responses go through a
//! single writer task, one JSON document per line.

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::handler::ToolHandler;
use crate::protocol::{
    CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ListPromptsResult,
    ListResourcesResult, ListToolsResult, PromptsCapability, ReadResourceParams,
    ReadResourceResult, ResourcesCapability, ServerCapabilities, ServerInfo, TextResourceContents,
    ToolsCapability, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR, PROTOCOL_VERSION,
};
use crate::tools::all_tools;

pub const SERVER_NAME: &str = "traverse-mcp";

/// MCP Server that communicates over stdio
pub struct McpServer {
    handler: ToolHandler,
    initialized: bool,
}

/// What to do with one incoming line
enum Reply {
    Now(JsonRpcResponse),
    Later,
    None,
}

impl McpServer {
    pub fn new(handler: ToolHandler) -> Self {
        Self {
            handler,
            initialized: false,
        }
    }

    /// Run the server, reading from stdin and writing to stdout
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        self.serve(reader, tokio::io::stdout()).await
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`
    pub async fn serve<R, W>(&mut self, mut reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(rx, writer));
        let mut calls = JoinSet::new();

        let mut buf = Vec::new();

        loop {
            buf.clear();
            let bytes_read = reader.read_until(b'\n', &mut buf).await?;

            if bytes_read == 0 {
                // EOF - client disconnected
                info!("Client disconnected");
                break;
            }

            let message = match std::str::from_utf8(&buf) {
                Ok(text) => text.trim(),
                Err(e) => {
                    error!("Failed to decode request: {}", e);
                    let resp =
                        JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e));
                    if tx.send(resp).is_err() {
                        break;
                    }
                    continue;
                }
            };
            if message.is_empty() {
                continue;
            }

            debug!("Received: {}", message);

            match self.handle_message(message, &tx, &mut calls) {
                Reply::Now(resp) => {
                    if tx.send(resp).is_err() {
                        break;
                    }
                }
                Reply::Later | Reply::None => {}
            }

            // Reap finished calls so the set does not grow unbounded
            while let Some(joined) = calls.try_join_next() {
                if let Err(e) = joined {
                    error!("Tool call task failed: {}", e);
                }
            }
        }

        while let Some(joined) = calls.join_next().await {
            if let Err(e) = joined {
                error!("Tool call task failed: {}", e);
            }
        }

        drop(tx);
        writer_task.await??;
        Ok(())
    }

    /// Handle a single JSON-RPC message
    fn handle_message(
        &mut self,
        message: &str,
        tx: &mpsc::UnboundedSender<JsonRpcResponse>,
        calls: &mut JoinSet<()>,
    ) -> Reply {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                return Reply::Now(JsonRpcResponse::error(
                    None,
                    PARSE_ERROR,
                    format!("Parse error: {}", e),
                ));
            }
        };

        let id = request.id.clone();

        if request.jsonrpc != "2.0" {
            warn!("Unsupported jsonrpc version: {}", request.jsonrpc);
            return match id {
                Some(_) => Reply::Now(JsonRpcResponse::error(
                    id,
                    INVALID_REQUEST,
                    format!("Unsupported jsonrpc version: {}", request.jsonrpc),
                )),
                None => Reply::None,
            };
        }

        // Handle notifications (no id means no response expected)
        if id.is_none() {
            self.handle_notification(&request.method, request.params);
            return Reply::None;
        }

        if request.method == "tools/call" {
            if !self.initialized {
                warn!("tools/call received before notifications/initialized");
            }
            return match parse_call_params(request.params) {
                Ok(params) => {
                    let handler = self.handler.clone();
                    let tx = tx.clone();
                    calls.spawn(async move {
                        info!("Calling tool: {}", params.name);
                        let result = handler.handle_tool(&params.name, params.arguments).await;
                        let resp = match serde_json::to_value(result) {
                            Ok(value) => JsonRpcResponse::success(id, value),
                            Err(e) => JsonRpcResponse::error(
                                id,
                                INTERNAL_ERROR,
                                format!("Serialization error: {}", e),
                            ),
                        };
                        let _ = tx.send(resp);
                    });
                    Reply::Later
                }
                Err((code, message)) => Reply::Now(JsonRpcResponse::error(id, code, message)),
            };
        }

        match self.handle_request(&request.method, request.params) {
            Ok(value) => Reply::Now(JsonRpcResponse::success(id, value)),
            Err((code, message)) => Reply::Now(JsonRpcResponse::error(id, code, message)),
        }
    }

    /// Handle a notification (no response expected)
    fn handle_notification(&mut self, method: &str, _params: Option<Value>) {
        match method {
            "notifications/initialized" => {
                info!("Client initialized");
                self.initialized = true;
            }
            "notifications/cancelled" => {
                // Submitted actions always run to completion
                debug!("Ignoring cancellation request");
            }
            _ => {
                debug!("Unknown notification: {}", method);
            }
        }
    }

    /// Handle a request and return the result
    fn handle_request(&mut self, method: &str, params: Option<Value>) -> Result<Value, (i32, String)> {
        if !self.initialized && method != "initialize" {
            debug!("{} received before client initialization", method);
        }

        match method {
            "initialize" => self.handle_initialize(params),
            "tools/list" => self.handle_list_tools(),
            "resources/list" => to_result(ListResourcesResult { resources: Vec::new() }),
            "resources/read" => self.handle_read_resource(params),
            "prompts/list" => to_result(ListPromptsResult { prompts: Vec::new() }),
            "ping" => Ok(json!({})),
            _ => {
                warn!("Unknown method: {}", method);
                Err((METHOD_NOT_FOUND, format!("Method not found: {}", method)))
            }
        }
    }

    /// Handle the initialize request
    fn handle_initialize(&mut self, _params: Option<Value>) -> Result<Value, (i32, String)> {
        info!("Initializing MCP server");

        to_result(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: true }),
                resources: Some(ResourcesCapability { subscribe: false }),
                prompts: Some(PromptsCapability {}),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        })
    }

    /// Handle the tools/list request
    fn handle_list_tools(&self) -> Result<Value, (i32, String)> {
        let tools = all_tools();
        debug!("Responding with {} tools", tools.len());
        to_result(ListToolsResult { tools })
    }

    /// Handle the resources/read request; no resources are published
    fn handle_read_resource(&self, params: Option<Value>) -> Result<Value, (i32, String)> {
        let params: ReadResourceParams = match params {
            Some(p) => serde_json::from_value(p)
                .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e)))?,
            None => return Err((INVALID_PARAMS, "Missing params".to_string())),
        };

        to_result(ReadResourceResult {
            contents: vec![TextResourceContents {
                text: format!("no content for {}", params.uri),
                uri: params.uri,
                mime_type: "text/plain".to_string(),
            }],
        })
    }
}

fn parse_call_params(params: Option<Value>) -> Result<CallToolParams, (i32, String)> {
    match params {
        Some(p) => serde_json::from_value(p)
            .map_err(|e| (INVALID_PARAMS, format!("Invalid params: {}", e))),
        None => Err((INVALID_PARAMS, "Missing params".to_string())),
    }
}

fn to_result<T: serde::Serialize>(result: T) -> Result<Value, (i32, String)> {
    serde_json::to_value(result).map_err(|e| (INTERNAL_ERROR, format!("Serialization error: {}", e)))
}

async fn write_responses<W>(
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
    mut writer: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(resp) = rx.recv().await {
        let resp_str = serde_json::to_string(&resp)?;
        debug!("Sending: {}", resp_str);
        writer.write_all(resp_str.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}
