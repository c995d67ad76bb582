//! Client configuration
//!
//! Settings are layered:
//! 1. Built-in defaults (5s timeouts, pooled connections, status not checked)
//! 2. Config file (TOML, see [`ClientConfig`])
//! 3. Builder calls / CLI flags

mod builder;
mod client;

pub use builder::RpcClientBuilder;
pub use client::{parse_endpoint, ClientConfig, ConfigError};
