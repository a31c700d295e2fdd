//! JSON-RPC 2.0 message types.
//!
//! Request identifiers are first-class here: the server keys in-flight
//! cancellation tokens by [`RequestId`], so ids travel as an opaque
//! typed handle rather than loose JSON values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request identifier — a JSON number or string, kept opaque.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Value);

impl RequestId {
    /// Wrap a raw id value, e.g. the target id carried by a
    /// `$/cancelRequest` notification's params.
    pub fn from_value(value: Value) -> Self {
        RequestId(value)
    }

    /// Canonical map key. The number `1` and the string `"1"` stay
    /// distinct.
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An incoming request or notification. The `jsonrpc` version marker
/// and any other unknown fields are ignored; `id` is absent for
/// notifications.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Whether this message is a notification (no response expected).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// An outgoing response. Exactly one of `result`/`error` is set; a
/// response to an unidentifiable message (parse error) carries a null
/// id.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,

    pub id: Option<RequestId>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// A success response.
    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    /// An error response.
    pub fn error(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(error) }
    }

    /// A `null` result, for queries that found nothing.
    pub fn null(id: Option<RequestId>) -> Self {
        Self::success(id, Value::Null)
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_has_no_id() {
        let request: JsonRpcRequest = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#,
        )
        .unwrap();
        assert!(request.is_notification());
        assert_eq!(request.method, "initialized");
    }

    #[test]
    fn request_id_keys_distinguish_numbers_from_strings() {
        let number = RequestId::from_value(serde_json::json!(1));
        let string = RequestId::from_value(serde_json::json!("1"));
        assert_ne!(number.key(), string.key());
        // Re-parsing the same wire id yields the same key.
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"id":1,"method":"shutdown"}"#).unwrap();
        assert_eq!(request.id.unwrap().key(), number.key());
    }

    #[test]
    fn error_response_omits_result() {
        let response = JsonRpcResponse::error(
            Some(RequestId::from_value(serde_json::json!(3))),
            JsonRpcError::new(-32601, "Method not found"),
        );
        let text = serde_json::to_string(&response).unwrap();
        assert!(!text.contains("\"result\""));
        assert!(text.contains("-32601"));
        assert!(text.contains("\"id\":3"));
    }

    #[test]
    fn null_result_serializes_explicitly() {
        let text = serde_json::to_string(&JsonRpcResponse::null(Some(RequestId::from_value(
            serde_json::json!(1),
        ))))
        .unwrap();
        assert!(text.contains("\"result\":null"));
    }
}
