//! Request envelope and encoder.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EncodeError;
use crate::JSONRPC_VERSION;

/// JSON-RPC request envelope.
///
/// Field declaration order is the wire order: `jsonrpc`, `method`,
/// `params`, `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// Remote method name.
    pub method: String,
    /// The single argument, omitted for parameterless calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Per-call id. Responses are not correlated against it.
    pub id: i64,
}

impl RequestEnvelope {
    /// Build an envelope for `method`.
    ///
    /// A `params` value of JSON `null` is dropped, so a null argument and a
    /// missing argument produce the same wire request.
    pub fn new(method: impl Into<String>, params: Option<Value>, id: i64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params: params.filter(|p| !p.is_null()),
            id,
        }
    }
}

/// Encode a request for `method` into wire bytes.
///
/// The argument is serialized first; failures surface as
/// [`EncodeError`] before anything touches the network.
pub fn encode_request<P: Serialize>(
    method: &str,
    arg: Option<&P>,
    id: i64,
) -> Result<Vec<u8>, EncodeError> {
    let params = arg.map(serde_json::to_value).transpose()?;
    let envelope = RequestEnvelope::new(method, params, id);
    Ok(serde_json::to_vec(&envelope)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_field_order() {
        let bytes = encode_request("test", Some(&json!({"name": "David"})), 7).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            r#"{"jsonrpc":"2.0","method":"test","params":{"name":"David"},"id":7}"#
        );
    }

    #[test]
    fn test_no_argument_omits_params() {
        let bytes = encode_request::<()>("ping", None, 1).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, r#"{"jsonrpc":"2.0","method":"ping","id":1}"#);
        assert!(!text.contains("params"));
    }

    #[test]
    fn test_null_argument_is_omitted() {
        let arg: Option<String> = None;
        let bytes = encode_request("maybe", Some(&arg), 1).unwrap();
        let tree: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(tree.get("params").is_none());
    }

    #[test]
    fn test_negative_id() {
        let bytes = encode_request::<()>("ping", None, -42).unwrap();
        let tree: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(tree["id"], json!(-42));
    }

    #[test]
    fn test_unserializable_argument() {
        let mut arg = HashMap::new();
        arg.insert((1u8, 2u8), "tuple keys are not JSON object keys");

        let result = encode_request("bad", Some(&arg), 1);
        assert!(matches!(result, Err(EncodeError::Serialize(_))));
    }

    #[test]
    fn test_envelope_parsing() {
        let json = r#"{"jsonrpc":"2.0","method":"status","id":3}"#;
        let envelope: RequestEnvelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.method, "status");
        assert!(envelope.params.is_none());
    }

    proptest! {
        #[test]
        fn params_round_trip(name in "[a-zA-Z0-9 ]{0,24}", age in any::<i32>(), tags in proptest::collection::vec("[a-z]{1,8}", 0..4)) {
            let arg = json!({"name": name, "age": age, "tags": tags});
            let bytes = encode_request("test", Some(&arg), 1).unwrap();
            let envelope: RequestEnvelope = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(envelope.params, Some(arg));
        }
    }
}
