//! Requests as seen by the test server.

use hyper::body::Bytes;
use hyper::Request;
use serde_json::Value;

/// A request as received by the test server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Request target, e.g. `/rpc`.
    pub path: String,
    /// Headers in arrival order, names lowercased.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Record a request head together with its collected body.
    pub(crate) fn new(head: &Request<()>, body: &Bytes) -> Self {
        let headers = head
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        Self {
            method: head.method().to_string(),
            path: head.uri().path().to_string(),
            headers,
            body: body.to_vec(),
        }
    }

    /// First header value with the given (case-insensitive) name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Body parsed as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// The JSON-RPC `method` member of the body.
    pub fn rpc_method(&self) -> Option<String> {
        self.json()
            .and_then(|v| v.get("method").and_then(Value::as_str).map(String::from))
    }

    /// The JSON-RPC `params` member of the body.
    pub fn params(&self) -> Option<Value> {
        self.json().and_then(|v| v.get("params").cloned())
    }
}
