//! Call error taxonomy.

use slug_rpc_protocol::{EncodeError, ProtocolError, ResponseError, RpcError, INTERNAL_ERROR};

use super::contract::ContractError;
use super::transport::TransportError;

/// Outcome of a failed call. Exactly one of these per failed invocation.
#[derive(Debug, thiserror::Error)]
pub enum CallError {
    /// Rejected locally before encoding
    #[error("Contract error: {0}")]
    Contract(#[from] ContractError),

    /// Argument could not be encoded; nothing was sent
    #[error("Serialization error: {0}")]
    Serialization(#[from] EncodeError),

    /// No interpretable response exists
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response received but not usable
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Well-formed error from the remote side
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),
}

impl From<ResponseError> for CallError {
    fn from(e: ResponseError) -> Self {
        match e {
            ResponseError::Rpc(e) => CallError::Rpc(e),
            ResponseError::Protocol(e) => CallError::Protocol(e),
        }
    }
}

/// Failure kind for exit code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Contract = 2,
    Serialization = 3,
    Transport = 20,
    Protocol = 30,
    Rpc = 40,
}

/// Stage of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStage {
    Encoding,
    Sending,
    Decoding,
}

impl CallError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CallError::Contract(_) => ErrorKind::Contract,
            CallError::Serialization(_) => ErrorKind::Serialization,
            CallError::Transport(_) => ErrorKind::Transport,
            CallError::Protocol(_) => ErrorKind::Protocol,
            CallError::Rpc(_) => ErrorKind::Rpc,
        }
    }

    /// Get exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.kind() as i32
    }

    /// Stage the call failed in. Contract errors happen before any stage.
    pub fn stage(&self) -> Option<CallStage> {
        match self {
            CallError::Contract(_) => None,
            CallError::Serialization(_) => Some(CallStage::Encoding),
            CallError::Transport(_) => Some(CallStage::Sending),
            CallError::Protocol(_) | CallError::Rpc(_) => Some(CallStage::Decoding),
        }
    }

    /// JSON-RPC error code, where one applies
    pub fn code(&self) -> Option<i32> {
        match self {
            CallError::Rpc(e) => Some(e.code),
            CallError::Protocol(e) => Some(e.code()),
            CallError::Transport(_) => Some(INTERNAL_ERROR),
            CallError::Contract(_) | CallError::Serialization(_) => None,
        }
    }

    /// True when the request never produced a response
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }

    pub fn as_rpc(&self) -> Option<&RpcError> {
        match self {
            CallError::Rpc(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for RPC calls
pub type CallResult<T> = Result<T, CallError>;
