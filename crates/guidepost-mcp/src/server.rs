//! Tool registration and request dispatch

use guidepost_core::{SearchHit, Searcher};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::protocol::{
    method_names, JsonRpcRequest, JsonRpcResponse, RequestId, RpcError, MCP_PROTOCOL_VERSION,
};
use crate::transport::{StdioTransport, TransportError, TransportResult};

pub const SERVER_NAME: &str = "guidepost-mcp";

/// The single tool this server exposes
pub const SEARCH_TOOL: &str = "search_guides";

/// MCP server answering semantic searches over the loaded snapshot.
///
/// The searcher is constructed before the server and owns the immutable
/// snapshot; the server only tracks protocol state.
pub struct SearchServer {
    searcher: Searcher,
    initialized: bool,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SearchArguments {
    query: String,
    #[serde(default)]
    limit: Option<i64>,
}

impl SearchServer {
    pub fn new(searcher: Searcher) -> Self {
        Self {
            searcher,
            initialized: false,
        }
    }

    /// Handle one request. `None` means nothing is written back
    /// (notifications).
    pub async fn handle(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = request.id.clone();
        match request.method.as_str() {
            method_names::INITIALIZE => {
                self.initialized = true;
                Some(JsonRpcResponse::success(id, self.initialize_result()))
            }
            method_names::INITIALIZED => None,
            method_names::PING => Some(JsonRpcResponse::success(id, json!({}))),
            method_names::TOOLS_LIST => Some(JsonRpcResponse::success(
                id,
                json!({ "tools": tool_definitions() }),
            )),
            method_names::TOOLS_CALL => Some(self.handle_tool_call(id, request.params).await),
            other => {
                if request.is_notification() {
                    debug!(method = other, "ignoring unknown notification");
                    return None;
                }
                Some(JsonRpcResponse::error(id, RpcError::method_not_found(other)))
            }
        }
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    async fn handle_tool_call(
        &mut self,
        id: Option<RequestId>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        if !self.initialized {
            return JsonRpcResponse::error(id, RpcError::not_initialized());
        }

        let params: CallToolParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(params)) => params,
            Ok(None) => return JsonRpcResponse::error(id, RpcError::invalid_params("missing params")),
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    RpcError::invalid_params(format!("invalid params: {}", e)),
                )
            }
        };

        if params.name != SEARCH_TOOL {
            return JsonRpcResponse::error(
                id,
                RpcError::invalid_params(format!("unknown tool: {}", params.name)),
            );
        }

        let arguments: SearchArguments = match params.arguments.map(serde_json::from_value).transpose()
        {
            Ok(Some(arguments)) => arguments,
            Ok(None) => {
                return JsonRpcResponse::error(id, RpcError::invalid_params("missing arguments"))
            }
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    RpcError::invalid_params(format!("invalid arguments: {}", e)),
                )
            }
        };

        // Non-positive limits fall back to the configured default
        let limit = arguments
            .limit
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n > 0);

        match self.searcher.query(&arguments.query, limit).await {
            Ok(hits) => JsonRpcResponse::success(id, tool_result(&hits)),
            Err(e) => {
                warn!(error = %e, "search failed");
                JsonRpcResponse::error(id, RpcError::internal(format!("search failed: {}", e)))
            }
        }
    }
}

fn tool_definitions() -> Value {
    json!([{
        "name": SEARCH_TOOL,
        "description": "Semantic search over project guideline documents.",
        "inputSchema": {
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Search query" },
                "limit": { "type": "number", "description": "Number of results", "default": 5 }
            },
            "required": ["query"]
        }
    }])
}

/// Wrap ranked hits as an MCP text content block carrying the
/// pretty-printed `{results}` payload
fn tool_result(hits: &[SearchHit]) -> Value {
    let payload = json!({ "results": hits });
    let text = serde_json::to_string_pretty(&payload).unwrap_or_default();
    json!({ "content": [ { "type": "text", "text": text } ] })
}

/// Drive the request loop until stdin closes.
///
/// Malformed lines are answered with a parse error and the loop continues;
/// I/O failures end it.
pub async fn run<R, W>(
    server: &mut SearchServer,
    transport: &mut StdioTransport<R, W>,
) -> TransportResult<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        match transport.read_message::<JsonRpcRequest>().await {
            Ok(Some(request)) => {
                debug!(method = %request.method, "request");
                if let Some(response) = server.handle(request).await {
                    transport.write_message(&response).await?;
                }
            }
            Ok(None) => {
                info!("stdin closed, shutting down");
                return Ok(());
            }
            Err(TransportError::Json(e)) => {
                warn!(error = %e, "malformed request line");
                let response = JsonRpcResponse::error(None, RpcError::parse_error(e.to_string()));
                transport.write_message(&response).await?;
            }
            Err(e) => return Err(e),
        }
    }
}
