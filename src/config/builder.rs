//! Client builder
//!
//! Collects endpoint and transport settings, validates them, and produces
//! an [`RpcClient`] backed by [`HttpTransport`].

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use super::client::{parse_endpoint, ClientConfig, ConfigError};
use crate::client::{HttpConfig, HttpTransport, IdGenerator, RandomIdGenerator, RpcClient, Transport};

/// Builder for [`RpcClient`]
pub struct RpcClientBuilder {
    http: HttpConfig,
    ids: Arc<dyn IdGenerator>,
}

impl RpcClientBuilder {
    /// Start from an endpoint URL with default transport settings
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_url(parse_endpoint(endpoint)?))
    }

    pub fn from_url(endpoint: Url) -> Self {
        Self {
            http: HttpConfig::new(endpoint),
            ids: Arc::new(RandomIdGenerator),
        }
    }

    /// Start from a validated configuration file
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(&config.endpoint)?
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .read_timeout(Duration::from_millis(config.read_timeout_ms))
            .user_agent(config.user_agent.clone())
            .check_status(config.check_status)
            .pooled(config.pooled))
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.http.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.http.read_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = user_agent.into();
        self
    }

    /// Fail calls whose HTTP status is not 2xx before decoding the body
    pub fn check_status(mut self, check: bool) -> Self {
        self.http.check_status = check;
        self
    }

    /// Keep idle connections for reuse; `false` opens a connection per call
    pub fn pooled(mut self, pooled: bool) -> Self {
        self.http.pooled = pooled;
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn http_config(&self) -> &HttpConfig {
        &self.http
    }

    /// Build a client over HTTP
    pub fn build(self) -> Result<RpcClient, ConfigError> {
        self.validate()?;
        let transport = HttpTransport::new(self.http)?;
        Ok(RpcClient::with_id_generator(Arc::new(transport), self.ids))
    }

    /// Build a client over a caller-supplied transport, keeping the id generator
    pub fn build_with_transport(self, transport: Arc<dyn Transport>) -> RpcClient {
        RpcClient::with_id_generator(transport, self.ids)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.connect_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.http.read_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "read_timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockTransport, SequentialIdGenerator};

    #[test]
    fn test_builder_defaults() {
        let builder = RpcClientBuilder::new("http://localhost:8080/rpc").unwrap();
        let http = builder.http_config();
        assert_eq!(http.endpoint.as_str(), "http://localhost:8080/rpc");
        assert_eq!(http.connect_timeout, Duration::from_millis(5000));
        assert_eq!(http.read_timeout, Duration::from_millis(5000));
        assert!(!http.check_status);
        assert!(http.pooled);
    }

    #[test]
    fn test_builder_rejects_bad_endpoint() {
        assert!(matches!(
            RpcClientBuilder::new("mailto:ops@example.com"),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn test_from_config() {
        let mut config = ClientConfig::new("https://rpc.example.com/v1");
        config.read_timeout_ms = 1500;
        config.check_status = true;
        config.pooled = false;

        let builder = RpcClientBuilder::from_config(&config).unwrap();
        let http = builder.http_config();
        assert_eq!(http.read_timeout, Duration::from_millis(1500));
        assert!(http.check_status);
        assert!(!http.pooled);
    }

    #[test]
    fn test_zero_timeout_rejected_at_build() {
        let result = RpcClientBuilder::new("http://localhost/rpc")
            .unwrap()
            .connect_timeout(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_build_with_transport_keeps_id_generator() {
        let transport = Arc::new(MockTransport::replying("{}"));
        let client = RpcClientBuilder::new("http://localhost/rpc")
            .unwrap()
            .id_generator(Arc::new(SequentialIdGenerator::new(7)))
            .build_with_transport(transport.clone());

        client.invoke_value("ping", None).unwrap();
        assert_eq!(transport.last_request().unwrap()["id"], 7);
    }

    #[test]
    fn test_build_http_client() {
        let client = RpcClientBuilder::new("http://127.0.0.1:1/rpc")
            .unwrap()
            .pooled(false)
            .build();
        assert!(client.is_ok());
    }
}
