//! RPC Invocation Dispatcher
//!
//! Runs one call end to end: encode, send, decode. The client keeps no
//! per-call state, so a single instance can be shared across threads.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use slug_rpc_protocol::{decode_response, encode_request};

use super::error::{CallResult, CallStage};
use super::id::{IdGenerator, RandomIdGenerator};
use super::transport::Transport;

/// Blocking JSON-RPC client
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
}

impl RpcClient {
    /// Create a new RPC client with random request ids
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_id_generator(transport, Arc::new(RandomIdGenerator))
    }

    pub fn with_id_generator(transport: Arc<dyn Transport>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { transport, ids }
    }

    /// Call `method` with an optional argument and decode the result as `R`.
    ///
    /// Pass `None::<&()>` for parameterless methods.
    pub fn invoke<P, R>(&self, method: &str, arg: Option<&P>) -> CallResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.ids.next_id();

        tracing::debug!(method, id, stage = ?CallStage::Encoding, "encoding request");
        let body = encode_request(method, arg, id)?;

        tracing::debug!(method, id, stage = ?CallStage::Sending, bytes = body.len(), "sending request");
        let response = self.transport.send(&body)?;
        if !response.is_success() {
            tracing::debug!(method, id, status = response.status, "decoding body of non-success status");
        }

        tracing::debug!(
            method,
            id,
            stage = ?CallStage::Decoding,
            status = response.status,
            bytes = response.body.len(),
            "decoding response"
        );
        match decode_response(&response.body) {
            Ok(value) => {
                tracing::debug!(method, id, "call succeeded");
                Ok(value)
            }
            Err(e) => {
                tracing::debug!(method, id, "call failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Call `method` with an untyped argument and return the untyped result.
    pub fn invoke_value(&self, method: &str, arg: Option<Value>) -> CallResult<Value> {
        self.invoke(method, arg.as_ref())
    }
}
