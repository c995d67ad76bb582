//! Client configuration file
//!
//! Parses and validates client settings from TOML:
//!
//! ```toml
//! endpoint = "http://localhost:8080/rpc"
//! connect_timeout_ms = 5000
//! read_timeout_ms = 5000
//! user_agent = "Slug-RPC-Client"
//! check_status = false
//! pooled = true
//! ```

use std::path::{Path, PathBuf};

use reqwest::Url;
use serde::{Deserialize, Serialize};
use slug_rpc_protocol::USER_AGENT;

use crate::client::TransportError;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Service endpoint URL (http or https)
    pub endpoint: String,

    /// Connect timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Read timeout in milliseconds (default: 5000)
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Treat non-2xx HTTP statuses as transport errors (default: false)
    #[serde(default)]
    pub check_status: bool,

    /// Reuse idle connections between calls (default: true)
    #[serde(default = "default_pooled")]
    pub pooled: bool,
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

fn default_pooled() -> bool {
    true
}

/// Errors that can occur when loading configuration or building a client
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to create transport: {0}")]
    Transport(#[from] TransportError),
}

impl ClientConfig {
    /// Configuration with defaults for everything but the endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout_ms: default_timeout_ms(),
            read_timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
            check_status: false,
            pooled: default_pooled(),
        }
    }

    /// Load configuration from a specific path
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_endpoint(&self.endpoint)?;

        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connect_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "read_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse an endpoint URL, accepting only http and https
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ClientConfig::parse(r#"endpoint = "http://localhost:8080/rpc""#).unwrap();
        assert_eq!(config, ClientConfig::new("http://localhost:8080/rpc"));
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.read_timeout_ms, 5000);
        assert_eq!(config.user_agent, "Slug-RPC-Client");
        assert!(!config.check_status);
        assert!(config.pooled);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
            endpoint = "https://rpc.example.com/v1"
            connect_timeout_ms = 250
            read_timeout_ms = 1000
            user_agent = "inventory-sync/2.1"
            check_status = true
            pooled = false
        "#;

        let config = ClientConfig::parse(content).unwrap();
        assert_eq!(config.connect_timeout_ms, 250);
        assert_eq!(config.read_timeout_ms, 1000);
        assert_eq!(config.user_agent, "inventory-sync/2.1");
        assert!(config.check_status);
        assert!(!config.pooled);
    }

    #[test]
    fn test_missing_endpoint() {
        let result = ClientConfig::parse("read_timeout_ms = 10");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = ClientConfig::parse(
            r#"
            endpoint = "http://localhost/rpc"
            retries = 3
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_endpoints() {
        for endpoint in ["not a url", "ftp://files.example.com/rpc", "localhost:8080"] {
            let result = ClientConfig::new(endpoint).validate();
            assert!(
                matches!(result, Err(ConfigError::InvalidEndpoint { .. })),
                "{} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ClientConfig::new("http://localhost/rpc");
        config.read_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("read_timeout_ms"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"endpoint = "http://127.0.0.1:9000/rpc""#).unwrap();
        writeln!(file, "read_timeout_ms = 750").unwrap();

        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/rpc");
        assert_eq!(config.read_timeout_ms, 750);
    }

    #[test]
    fn test_load_missing_file() {
        let result = ClientConfig::load(Path::new("/nonexistent/slug-rpc.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
