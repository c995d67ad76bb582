//! Slug RPC - blocking JSON-RPC 2.0 client over HTTP
//!
//! A call is one HTTP POST carrying a request envelope. The response is
//! decoded into the caller's type, or into an [`RpcError`] when the server
//! reports one. Clients are bound to a service either through
//! [`rpc_service!`] (typed, compile time) or through a [`ServiceContract`]
//! loaded at runtime.

pub mod client;
pub mod config;

pub use client::{
    CallError, CallResult, CallStage, ContractClient, ContractError, ErrorKind, HttpConfig,
    HttpTransport, IdGenerator, MethodDescriptor, MockTransport, RandomIdGenerator, RpcClient,
    SequentialIdGenerator, ServiceContract, Transport, TransportError, TransportResponse,
};
pub use config::{ClientConfig, ConfigError, RpcClientBuilder};
pub use slug_rpc_protocol::{
    EncodeError, ProtocolError, RpcError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
