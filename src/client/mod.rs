//! Client-Side Components
//!
//! Implements the client half of the protocol: transports, request ids,
//! the per-call dispatcher, and contract-bound clients.

pub mod contract;
pub mod dispatch;
pub mod error;
pub mod id;
pub mod service;
pub mod transport;

pub use contract::{ContractError, MethodDescriptor, ServiceContract};
pub use dispatch::RpcClient;
pub use error::{CallError, CallResult, CallStage, ErrorKind};
pub use id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use service::ContractClient;
pub use transport::{
    HttpConfig, HttpTransport, MockTransport, Transport, TransportError, TransportResponse,
};
