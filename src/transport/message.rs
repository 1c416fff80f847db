//! Wire types for the message transport

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Routing part of a request, e.g. `{"cmd": "get_products"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagePattern {
    pub cmd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Correlation id echoed back in the response
    #[serde(default)]
    pub id: String,
    pub pattern: MessagePattern,
    #[serde(default)]
    pub data: Value,
}

impl MessageRequest {
    pub fn new(id: impl Into<String>, cmd: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            pattern: MessagePattern { cmd: cmd.into() },
            data,
        }
    }
}

/// Error payload: a machine-readable status plus a human message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageError {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<MessageError>,
    pub is_disposed: bool,
}

impl MessageResponse {
    pub fn ok(id: impl Into<String>, value: Value) -> Self {
        Self {
            id: id.into(),
            response: Some(value),
            err: None,
            is_disposed: true,
        }
    }

    pub fn error(id: impl Into<String>, status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            response: None,
            err: Some(MessageError {
                status: status.into(),
                message: message.into(),
            }),
            is_disposed: true,
        }
    }

    pub fn is_error(&self) -> bool {
        self.err.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_deserialize() {
        let line = r#"{"id":"7","pattern":{"cmd":"get_product"},"data":"abc"}"#;
        let req: MessageRequest = serde_json::from_str(line).unwrap();
        assert_eq!(req, MessageRequest::new("7", "get_product", json!("abc")));
    }

    #[test]
    fn test_request_without_data() {
        let line = r#"{"id":"1","pattern":{"cmd":"get_products"}}"#;
        let req: MessageRequest = serde_json::from_str(line).unwrap();
        assert_eq!(req.data, Value::Null);
    }

    #[test]
    fn test_ok_response_shape() {
        let resp = MessageResponse::ok("1", json!([]));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value, json!({"id": "1", "response": [], "isDisposed": true}));
    }

    #[test]
    fn test_error_response_shape() {
        let resp = MessageResponse::error("2", "not_found", "abc");
        assert!(resp.is_error());
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "2",
                "err": {"status": "not_found", "message": "abc"},
                "isDisposed": true
            })
        );
    }
}
