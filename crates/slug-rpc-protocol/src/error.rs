//! Error types for the RPC protocol.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Invalid JSON was received.
///
/// Also the fallback code for error objects whose `code` is missing or is
/// not a 32-bit integer.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i32 = -32603;

/// Remote error carried back from an `error` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{message} (code={code})")]
pub struct RpcError {
    /// Error code from the response.
    pub code: i32,
    /// Error message from the response, or a synthesized diagnostic.
    pub message: String,
    /// Opaque payload from the response, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Create a new RPC error.
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Attach a data payload.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// A response arrived but could not be interpreted.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ProtocolError {
    message: String,
    raw: Vec<u8>,
    #[source]
    source: Option<serde_json::Error>,
}

impl ProtocolError {
    pub fn new(message: impl Into<String>, raw: &[u8]) -> Self {
        Self {
            message: message.into(),
            raw: raw.to_vec(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, raw: &[u8], source: serde_json::Error) -> Self {
        Self {
            message: message.into(),
            raw: raw.to_vec(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The response body exactly as received.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The response body as (lossy) UTF-8 text.
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }

    /// JSON-RPC code reported for protocol failures.
    pub fn code(&self) -> i32 {
        PARSE_ERROR
    }
}

/// Failure decoding a response envelope.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Failure encoding a request.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Error serializing to JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Turn an `error` object into an [`RpcError`].
///
/// Malformed members fall back instead of failing: a missing or non-int32
/// `code` becomes [`PARSE_ERROR`], a missing or non-string `message` becomes
/// a diagnostic that embeds the raw response.
pub fn map_error(error: &Map<String, Value>, raw: &[u8]) -> RpcError {
    let code = error
        .get("code")
        .and_then(Value::as_i64)
        .and_then(|c| i32::try_from(c).ok())
        .unwrap_or(PARSE_ERROR);

    let message = match error.get("message") {
        None => format!(
            "No error message present in response: {}",
            String::from_utf8_lossy(raw)
        ),
        Some(Value::String(message)) => message.clone(),
        Some(_) => format!(
            "Error message in response is not a string: {}",
            String::from_utf8_lossy(raw)
        ),
    };

    let data = error.get("data").filter(|d| !d.is_null()).cloned();

    RpcError {
        code,
        message,
        data,
    }
}
