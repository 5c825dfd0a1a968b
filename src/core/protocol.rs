//! JSON-RPC wire types shared by every transport.
//!
//! Requests are accepted leniently: `jsonrpc` is not validated and any JSON
//! object is turned into a request. Responses always carry `"jsonrpc": "2.0"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::Error;

/// JSON-RPC protocol version written on every response.
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard MCP methods served by this crate.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const LIST_RESOURCES: &str = "resources/list";
    pub const READ_RESOURCE: &str = "resources/read";
    pub const NOTIFICATION_PREFIX: &str = "notifications/";
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcRequest {
    /// Build a request from an already parsed JSON value.
    ///
    /// Returns `None` when the value is not an object. A missing or
    /// non-string `method` becomes the empty method name, which the
    /// dispatcher answers with "Method not found".
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut object) = value else {
            return None;
        };

        let jsonrpc = match object.remove("jsonrpc") {
            Some(Value::String(version)) => version,
            _ => String::new(),
        };
        let method = match object.remove("method") {
            Some(Value::String(method)) => method,
            _ => String::new(),
        };

        Some(Self {
            jsonrpc,
            id: object.remove("id").filter(|id| !id.is_null()),
            method,
            params: object.remove("params"),
        })
    }

    /// Whether this message is a notification that expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none() && self.method.starts_with(methods::NOTIFICATION_PREFIX)
    }

    /// Look up a string parameter by name.
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.params.as_ref()?.get(name)?.as_str()
    }
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Create an error response from a server error.
    pub fn from_error(id: Option<Value>, err: &Error) -> Self {
        Self::error(id, err.code().0, err.to_string())
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, rmcp::model::ErrorCode::INTERNAL_ERROR.0, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_jsonrpc_field_is_accepted() {
        let request = JsonRpcRequest::from_value(json!({"id": 4, "method": "foo"})).unwrap();
        assert_eq!(request.id, Some(json!(4)));
        assert_eq!(request.method, "foo");
        assert!(request.params.is_none());
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(JsonRpcRequest::from_value(json!([1, 2, 3])).is_none());
        assert!(JsonRpcRequest::from_value(json!("initialize")).is_none());
    }

    #[test]
    fn test_non_string_method_becomes_empty() {
        let request = JsonRpcRequest::from_value(json!({"id": 1, "method": 7})).unwrap();
        assert_eq!(request.method, "");
    }

    #[test]
    fn test_notification_detection() {
        let note =
            JsonRpcRequest::from_value(json!({"method": "notifications/initialized"})).unwrap();
        assert!(note.is_notification());

        let with_id =
            JsonRpcRequest::from_value(json!({"id": 9, "method": "notifications/initialized"}))
                .unwrap();
        assert!(!with_id.is_notification());
    }

    #[test]
    fn test_str_param() {
        let request = JsonRpcRequest::from_value(json!({
            "id": 2,
            "method": "resources/read",
            "params": {"uri": "tsunami://context/a/b.md", "n": 1}
        }))
        .unwrap();
        assert_eq!(request.str_param("uri"), Some("tsunami://context/a/b.md"));
        assert_eq!(request.str_param("n"), None);
        assert_eq!(request.str_param("missing"), None);
    }

    #[test]
    fn test_error_response_shape() {
        let response = JsonRpcResponse::error(Some(json!(3)), -32602, "Resource not found");
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "error": {"code": -32602, "message": "Resource not found"}
            })
        );
    }
}
