//! Response envelope decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{map_error, ProtocolError, ResponseError};

/// Decode a raw response body into `R`.
///
/// `error` is checked before `result`, so an envelope carrying both is an
/// error. An envelope with neither decodes `R` from JSON `null`, which
/// yields the void value for `()`, `Option<T>` and `Value`.
pub fn decode_response<R: DeserializeOwned>(raw: &[u8]) -> Result<R, ResponseError> {
    let tree: Value = serde_json::from_slice(raw)
        .map_err(|e| ProtocolError::with_source("Error parsing response", raw, e))?;

    if let Some(error) = tree.get("error") {
        let Some(error) = error.as_object() else {
            return Err(ProtocolError::new(
                "Error parsing response: 'error' is not an object",
                raw,
            )
            .into());
        };
        return Err(map_error(error, raw).into());
    }

    match tree.get("result") {
        Some(result) => serde_json::from_value(result.clone()).map_err(|e| {
            ProtocolError::with_source(
                format!(
                    "Error parsing result object {} as a {}",
                    result,
                    std::any::type_name::<R>()
                ),
                raw,
                e,
            )
            .into()
        }),
        None => serde_json::from_value(Value::Null).map_err(|e| {
            ProtocolError::with_source(
                format!(
                    "No result present in response to decode as a {}",
                    std::any::type_name::<R>()
                ),
                raw,
                e,
            )
            .into()
        }),
    }
}
