//! WebSocket RPC
//!
//! The wire surface for editor clients: one remote call (`save`) plus
//! server-initiated `reload` notifications. Frames are JSON-RPC shaped:
//! `{ id, method, params }` in, `{ id, result | error }` out.

pub mod backend;
pub mod server;

pub use backend::EditorBackend;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// An incoming RPC frame
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Error payload carried in a response frame
#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

/// An outgoing response frame
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i32, message: String) -> Self {
        Self {
            id,
            result: None,
            error: Some(RpcError { code, message }),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"id":null,"error":{"code":-32603,"message":"unserializable response"}}"#
                .to_string()
        })
    }
}

/// Server-initiated notification that a source file changed on disk
#[derive(Debug, Clone, Serialize)]
pub struct ReloadNotification {
    pub method: &'static str,
    pub params: ReloadParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReloadParams {
    pub file: String,
}

impl ReloadNotification {
    pub fn new(path: &Path) -> Self {
        Self {
            method: "reload",
            params: ReloadParams {
                file: path.display().to_string(),
            },
        }
    }
}
