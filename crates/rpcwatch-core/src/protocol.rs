//! JSON-RPC 2.0 wire types and inbound frame classification

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
    pub id: RequestId,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: RequestId,
}

/// JSON-RPC 2.0 Error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Request ID (can be string, number, or null)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

impl RpcError {
    pub const METHOD_NOT_FOUND: i64 = -32601;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Lenient conversion from whatever a server put in `error`.
    ///
    /// A missing `message` falls back to the serialized error value, a missing
    /// `code` to 0.
    fn from_loose(value: &Value) -> Self {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string());

        Self {
            code: value.get("code").and_then(Value::as_i64).unwrap_or(0),
            message,
            data: value.get("data").cloned(),
        }
    }
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Option<Map<String, Value>>, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }
}

impl RpcResponse {
    pub fn success(result: Value, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(error: RpcError, id: RequestId) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id,
        }
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Null => write!(f, "null"),
        }
    }
}

/// How an inbound text frame was understood.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// Not JSON, or not a JSON-RPC 2.0 object. Surfaced verbatim.
    Raw(String),
    Result {
        id: Option<RequestId>,
        result: Value,
    },
    Error {
        id: Option<RequestId>,
        error: RpcError,
    },
    /// JSON-RPC 2.0 object carrying neither `result` nor `error`.
    Empty { id: Option<RequestId> },
}

impl InboundFrame {
    /// Classify a raw text frame. Never fails.
    ///
    /// A present `result` key wins even when its value is `null`. An `error`
    /// of `null`, `false`, `0` or `""` is treated as absent.
    pub fn parse(text: &str) -> Self {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(_) => return InboundFrame::Raw(text.to_string()),
        };

        let Some(object) = value.as_object() else {
            return InboundFrame::Raw(text.to_string());
        };

        if object.get("jsonrpc").and_then(Value::as_str) != Some(JSONRPC_VERSION) {
            return InboundFrame::Raw(text.to_string());
        }

        let id = object
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

        if let Some(result) = object.get("result") {
            return InboundFrame::Result {
                id,
                result: result.clone(),
            };
        }

        match object.get("error") {
            Some(error) if !is_falsy(error) => InboundFrame::Error {
                id,
                error: RpcError::from_loose(error),
            },
            _ => InboundFrame::Empty { id },
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
