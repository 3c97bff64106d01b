use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rmcp::ServerHandler;
use serde::Serialize;
use serde_json::{json, Value};

use super::jsonrpc::{CallToolParams, JsonRpcError, JsonRpcResponse};
use crate::mcp::{ArgoMcpServer, SERVER_NAME};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================
// Server Descriptor
// ============================================================

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": SERVER_NAME,
        "version": VERSION,
        "description": "ArgoCD MCP Server with HTTP transport",
        "endpoints": {
            "health": "/health",
            "mcp": "/mcp",
        },
    }))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": SERVER_NAME,
        "version": VERSION,
    }))
}

// ============================================================
// JSON-RPC
// ============================================================

fn to_value<T: Serialize>(value: T) -> Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal(e.to_string()))
}

async fn tools_call(server: &ArgoMcpServer, params: Value) -> Result<Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)))?;
    let result = server
        .call_tool_value(&params.name, &params.arguments)
        .await;
    to_value(result)
}

/// `POST /mcp`: one JSON-RPC request per HTTP request.
///
/// Protocol failures are reported as JSON-RPC errors with HTTP 200; tool
/// failures are reported inside a successful `tools/call` result.
pub async fn mcp(State(server): State<ArgoMcpServer>, body: Bytes) -> Response {
    let request: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!("Error processing MCP request: {}", e);
            return Json(JsonRpcResponse::failure(
                Value::Null,
                JsonRpcError::internal(format!("Invalid JSON: {}", e)),
            ))
            .into_response();
        }
    };

    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let Some(method) = request.get("method").and_then(Value::as_str) else {
        tracing::error!("Error processing MCP request: missing method");
        return Json(JsonRpcResponse::failure(
            id,
            JsonRpcError::internal("Missing method"),
        ))
        .into_response();
    };

    tracing::info!("Received MCP request: {}", method);

    if method.starts_with("notifications/") {
        return StatusCode::ACCEPTED.into_response();
    }

    let params = request.get("params").cloned().unwrap_or(Value::Null);
    let outcome = match method {
        "initialize" => to_value(server.get_info()),
        "ping" => Ok(json!({})),
        "tools/list" => to_value(server.list_tools_result()),
        "tools/call" => tools_call(&server, params).await,
        other => Err(JsonRpcError::method_not_found(other)),
    };

    let response = match outcome {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(error) => {
            tracing::warn!(code = error.code, "{}", error.message);
            JsonRpcResponse::failure(id, error)
        }
    };
    Json(response).into_response()
}
