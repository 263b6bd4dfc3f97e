//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

use crate::Error;

/// Member of `params` carrying the web-service token.
pub const TOKEN_PARAM: &str = "wstoken";

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// `None` when the member is absent; an explicit `null` is `Some(Value::Null)`.
    #[serde(default, deserialize_with = "present")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    /// Requests without an id member are notifications and get no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    /// Always present; `null` when the request id could not be read.
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Error response for a failed function call, carrying the host-style
    /// `errorcode` in `data` where one applies.
    pub fn from_error(id: Option<Value>, err: &Error) -> Self {
        let mut response = Self::error(id, err.code(), err.to_string());
        if let (Some(error), Some(errorcode)) = (response.error.as_mut(), err.errorcode()) {
            error.data = Some(json!({ "errorcode": errorcode }));
        }
        response
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Split the token out of function call params.
///
/// Absent or `null` params become an empty object. Params that are neither
/// an object nor absent are rejected.
pub fn split_token(params: Value) -> Result<(Option<String>, Map<String, Value>), Error> {
    let mut params = match params {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidParameter(format!(
                "params must be an object, got {}",
                json_type_name(&other)
            )));
        }
    };

    let token = match params.remove(TOKEN_PARAM) {
        None | Some(Value::Null) => None,
        Some(Value::String(token)) => Some(token),
        Some(other) => {
            return Err(Error::InvalidParameter(format!(
                "{TOKEN_PARAM} must be a string, got {}",
                json_type_name(&other)
            )));
        }
    };
    Ok((token, params))
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
