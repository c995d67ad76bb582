//! Slug RPC Protocol Types
//!
//! Defines the JSON-RPC envelope spoken between a slug-rpc client and a
//! remote service, plus the pieces that turn it into and out of bytes:
//! - [`request`]: request envelope and encoder
//! - [`response`]: response envelope decoder
//! - [`error`]: error codes, the error mapper, and protocol-level errors

pub mod error;
pub mod request;
pub mod response;

pub use error::{
    map_error, EncodeError, ProtocolError, ResponseError, RpcError, INTERNAL_ERROR,
    INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, PARSE_ERROR,
};
pub use request::{encode_request, RequestEnvelope};
pub use response::decode_response;

/// Value of the `jsonrpc` member in every request.
pub const JSONRPC_VERSION: &str = "2.0";

/// Media type sent in `Content-Type` and `Accept`.
pub const MEDIA_TYPE: &str = "application/json-rpc";

/// Default `User-Agent` identifying this client.
pub const USER_AGENT: &str = "Slug-RPC-Client";
