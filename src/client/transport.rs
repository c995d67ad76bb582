//! Transport Layer for RPC Client
//!
//! Abstracts the HTTP exchange for testability. Provides:
//! - Transport trait: one POST of a request body, raw status + body back
//! - HttpTransport: blocking HTTP client for production
//! - MockTransport: scripted in-memory responses for unit tests

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use slug_rpc_protocol::{MEDIA_TYPE, USER_AGENT};

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5000);

/// Transport trait for RPC communication
pub trait Transport: Send + Sync {
    /// Send one request body and return the raw response
    fn send(&self, body: &[u8]) -> Result<TransportResponse, TransportError>;
}

/// Raw response as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The call never got a well-formed response
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("Request timed out: {}", e)
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            e.to_string()
        };
        Self::with_source(message, e)
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Service endpoint
    pub endpoint: Url,
    pub connect_timeout: Duration,
    /// Upper bound on waiting for response bytes
    pub read_timeout: Duration,
    pub user_agent: String,
    /// Treat non-2xx statuses as transport failures
    pub check_status: bool,
    /// Keep idle connections for reuse across calls
    pub pooled: bool,
}

impl HttpConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            check_status: false,
            pooled: true,
        }
    }
}

/// HTTP transport for production use
///
/// Each call is a single POST of the encoded envelope. The response body is
/// read fully into memory before returning.
pub struct HttpTransport {
    config: HttpConfig,
    client: Client,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration
    pub fn new(config: HttpConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(config.user_agent.clone());

        if !config.pooled {
            builder = builder.pool_max_idle_per_host(0);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::with_source("Failed to build HTTP client", e))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

impl Transport for HttpTransport {
    fn send(&self, body: &[u8]) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .header(CONTENT_TYPE, MEDIA_TYPE)
            .header(ACCEPT, MEDIA_TYPE)
            .body(body.to_vec())
            .send()
            .map_err(|e| {
                tracing::warn!(endpoint = %self.config.endpoint, "POST failed: {}", e);
                TransportError::from(e)
            })?;

        let status = response.status();
        if self.config.check_status && !status.is_success() {
            tracing::warn!(endpoint = %self.config.endpoint, %status, "non-success status");
            return Err(TransportError::new(status.to_string()));
        }

        let body = response.bytes().map_err(|e| {
            tracing::warn!(endpoint = %self.config.endpoint, "reading response failed: {}", e);
            TransportError::with_source(format!("Error reading response body: {}", e), e)
        })?;

        Ok(TransportResponse::new(status.as_u16(), body.to_vec()))
    }
}

/// Mock transport for testing - serves queued responses in order
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, String>>>,
    sent: Mutex<Vec<Vec<u8>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers once with `body` and status 200
    pub fn replying(body: &str) -> Self {
        let transport = Self::new();
        transport.push_body(body);
        transport
    }

    /// Queue a 200 response
    pub fn push_body(&self, body: &str) {
        self.push_response(TransportResponse::new(200, body));
    }

    pub fn push_response(&self, response: TransportResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a transport failure
    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Request bodies sent so far
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Last request body parsed as JSON
    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.sent
            .lock()
            .unwrap()
            .last()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

impl Transport for MockTransport {
    fn send(&self, body: &[u8]) -> Result<TransportResponse, TransportError> {
        self.sent.lock().unwrap().push(body.to_vec());
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(message)),
            None => Err(TransportError::new("No response queued")),
        }
    }
}
