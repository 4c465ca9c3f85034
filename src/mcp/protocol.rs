//! MCP wire types (JSON-RPC 2.0)
//!
//! Only the slice of the Model Context Protocol that a scanning client needs:
//! the initialize handshake, `tools/list` and `tools/call`.
//!
//! - JSON-RPC 2.0: <https://www.jsonrpc.org/specification>
//! - MCP: <https://modelcontextprotocol.io/specification/2024-11-05>

use serde::{Deserialize, Serialize};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision advertised during `initialize`
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// A JSON-RPC 2.0 request (carries an `id`, expects a response)
///
/// ```json
/// {"jsonrpc": "2.0", "id": 1, "method": "tools/list"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpRequest {
    pub jsonrpc: String,

    /// Request identifier (used to match responses)
    pub id: u64,

    pub method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl McpRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 notification (no `id`, no response)
///
/// The client sends `notifications/initialized` once the initialize
/// response has been processed; servers refuse other requests until then.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpNotification {
    pub jsonrpc: String,

    pub method: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl McpNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: None,
        }
    }
}

/// A JSON-RPC 2.0 response
///
/// A response carries either `result` or `error`, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpResponse {
    pub jsonrpc: String,

    /// Must match the id of the request being answered
    pub id: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    pub fn ok(id: u64, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: u64, error: McpError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_some() && self.error.is_none()
    }

    /// Split into the result payload or the server error
    pub fn into_result(self) -> Result<serde_json::Value, McpError> {
        match (self.result, self.error) {
            (Some(result), None) => Ok(result),
            (None, Some(error)) => Err(error),
            (Some(_), Some(_)) => Err(McpError::internal_error(
                "Invalid response: both result and error present",
            )),
            (None, None) => Err(McpError::internal_error(
                "Invalid response: neither result nor error present",
            )),
        }
    }
}

/// A JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct McpError {
    pub code: i32,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl McpError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(-32601, format!("Method not found: {}", method.into()))
    }

    /// Invalid params (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(-32602, message)
    }

    /// Internal error (-32603)
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(-32603, message)
    }
}

impl std::fmt::Display for McpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Error {}] {}", self.code, self.message)
    }
}

impl std::error::Error for McpError {}

/// MCP methods used by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum McpMethod {
    Initialize,
    /// Notification sent after a successful `initialize`
    Initialized,
    ToolsList,
    ToolsCall,
}

impl McpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Initialized => "notifications/initialized",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
        }
    }
}

/// Parameters of the `initialize` request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,

    pub capabilities: ClientCapabilities,

    #[serde(rename = "clientInfo")]
    pub client_info: ClientInfo,
}

/// Client capabilities advertised during initialization
///
/// A scanning client offers no sampling or roots, so this is normally empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experimental: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// What the server reported in its `initialize` result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerCapabilities {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,

    #[serde(default)]
    pub capabilities: serde_json::Value,

    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Tool definition as returned by `tools/list`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tool {
    /// Tool name (unique identifier)
    pub name: String,

    /// Servers may omit the description
    #[serde(default)]
    pub description: String,

    /// JSON Schema of the tool arguments
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Parameters of `tools/call`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCallParams {
    pub name: String,
    pub arguments: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_request() {
        let req = McpRequest::new(1, McpMethod::ToolsList.as_str(), None);
        let json = serde_json::to_string(&req).unwrap();

        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":1"));
        assert!(json.contains("\"method\":\"tools/list\""));
        assert!(!json.contains("params"));
    }

    #[test]
    fn test_notification_has_no_id() {
        let note = McpNotification::new(McpMethod::Initialized.as_str());
        let value = serde_json::to_value(&note).unwrap();

        assert_eq!(value["method"], "notifications/initialized");
        assert!(value.get("id").is_none());
        assert!(value.get("params").is_none());
    }

    #[test]
    fn test_response_error_deserialize() {
        let raw = r#"{"jsonrpc":"2.0","id":7,"error":{"code":-32601,"message":"Method not found"}}"#;
        let resp: McpResponse = serde_json::from_str(raw).unwrap();

        assert_eq!(resp.id, 7);
        assert!(!resp.is_success());
        assert_eq!(resp.error.unwrap().code, -32601);
    }

    #[test]
    fn test_response_missing_id_is_rejected() {
        let raw = r#"{"jsonrpc":"2.0","result":{}}"#;
        assert!(serde_json::from_str::<McpResponse>(raw).is_err());
    }

    #[test]
    fn test_response_into_result() {
        let ok = McpResponse::ok(1, json!({"status": "ok"}));
        assert_eq!(ok.into_result().unwrap(), json!({"status": "ok"}));

        let err = McpError::invalid_params("bad params");
        let resp = McpResponse::err(1, err.clone());
        assert_eq!(resp.into_result().unwrap_err(), err);
    }

    #[test]
    fn test_response_into_result_invalid_shapes() {
        let both = McpResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: 1,
            result: Some(json!({})),
            error: Some(McpError::internal_error("boom")),
        };
        assert!(both.into_result().unwrap_err().message.contains("both"));

        let neither = McpResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: 1,
            result: None,
            error: None,
        };
        assert!(neither.into_result().unwrap_err().message.contains("neither"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(McpError::method_not_found("x").code, -32601);
        assert_eq!(McpError::invalid_params("x").code, -32602);
        assert_eq!(McpError::internal_error("x").code, -32603);
        assert_eq!(
            McpError::new(-32000, "scan failed").to_string(),
            "[Error -32000] scan failed"
        );
    }

    #[test]
    fn test_method_names() {
        assert_eq!(McpMethod::Initialize.as_str(), "initialize");
        assert_eq!(McpMethod::ToolsList.as_str(), "tools/list");
        assert_eq!(McpMethod::ToolsCall.as_str(), "tools/call");
    }

    #[test]
    fn test_tool_without_description() {
        let raw = r#"{"name":"semgrep_scan","inputSchema":{"type":"object"}}"#;
        let tool: Tool = serde_json::from_str(raw).unwrap();

        assert_eq!(tool.name, "semgrep_scan");
        assert!(tool.description.is_empty());
    }

    #[test]
    fn test_initialize_params_field_names() {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ClientCapabilities::default(),
            client_info: ClientInfo {
                name: "scanbridge".to_string(),
                version: "0.1.0".to_string(),
            },
        };
        let value = serde_json::to_value(&params).unwrap();

        assert_eq!(value["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(value["clientInfo"]["name"], "scanbridge");
        assert_eq!(value["capabilities"], json!({}));
    }
}
